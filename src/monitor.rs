//! Connection monitoring for the external engine
//!
//! Tracks probe and request outcomes and derives a connection status.
//! Pure state machine: it contains no timers and performs no I/O; the
//! simulation loop (or an explicit probe) feeds it outcomes.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Connection status towards the external engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Last contact succeeded
    Connected,
    /// Recent failures, threshold not yet reached
    Probing,
    /// Consecutive failures reached the threshold
    Disconnected,
    /// No contact attempted yet
    #[default]
    Unknown,
}

impl ConnectionStatus {
    /// Check whether the engine is considered usable
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Monitor configuration thresholds
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Consecutive failures before reporting Disconnected
    pub failure_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
        }
    }
}

/// Tracks engine reachability over time
#[derive(Debug)]
pub struct ConnectionMonitor {
    status: ConnectionStatus,
    consecutive_failures: u32,
    total_successes: u64,
    total_failures: u64,
    last_success: Option<Instant>,
    config: MonitorConfig,
}

impl ConnectionMonitor {
    /// Create a monitor with default thresholds
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    /// Create a monitor with custom configuration
    pub fn with_config(config: MonitorConfig) -> Self {
        Self {
            status: ConnectionStatus::Unknown,
            consecutive_failures: 0,
            total_successes: 0,
            total_failures: 0,
            last_success: None,
            config,
        }
    }

    /// Record a successful contact with the engine
    pub fn record_success(&mut self) {
        self.status = ConnectionStatus::Connected;
        self.consecutive_failures = 0;
        self.total_successes += 1;
        self.last_success = Some(Instant::now());
    }

    /// Record a failed contact with the engine
    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.total_failures += 1;

        self.status = if self.consecutive_failures >= self.config.failure_threshold {
            ConnectionStatus::Disconnected
        } else {
            ConnectionStatus::Probing
        };
    }

    /// Current status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Consecutive failures since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Total successes recorded
    pub fn total_successes(&self) -> u64 {
        self.total_successes
    }

    /// Total failures recorded
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    /// Time since the last successful contact, if any
    pub fn time_since_last_success(&self) -> Option<Duration> {
        self.last_success.map(|at| at.elapsed())
    }

    /// Generate a status report
    pub fn report(&self) -> String {
        format!(
            "Engine: {:?} ({} consecutive failures, {}/{} ok)",
            self.status,
            self.consecutive_failures,
            self.total_successes,
            self.total_successes + self.total_failures
        )
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
