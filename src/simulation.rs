// CREST - Compression Ratio Estimation and Simulation Toolkit
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Periodic simulation driver
//!
//! Drives the dashboard: on every tick it collects compression results
//! (from the external engine when one is configured and reachable,
//! otherwise from the estimator, clearly tagged as simulated), folds the
//! tick into the session metrics, churns the device fleet and appends a
//! history point.
//!
//! The scheduling discipline follows the concurrency model of the core:
//! the driver task is the only mutator of simulator state, a tick that is
//! still awaiting the engine delays the next one (missed ticks are
//! skipped, never run concurrently), and switching the interval to the
//! stopped sentinel deterministically cancels the pending tick.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::devices::{Device, DeviceFleet};
use crate::engine::EngineClient;
use crate::estimator::Estimator;
use crate::metrics::SessionMetrics;
use crate::monitor::{ConnectionMonitor, ConnectionStatus};
use crate::protocol::{Algorithm, CompressionResponse};

/// Configuration for the simulation driver
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Tick period (default: 2 s)
    pub update_interval: Duration,
    /// History ring size (default: 30 points)
    pub history_points: usize,
    /// Minimum bytes processed per tick (default: 1000)
    pub tick_data_min: u64,
    /// Maximum bytes processed per tick, exclusive (default: 10000)
    pub tick_data_max: u64,
    /// Ratio assumed when a tick produced no results (default: 0.4)
    pub assumed_ratio: f64,
    /// Chance that a tick refreshes the device fleet (default: 0.3)
    pub device_refresh_chance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(2),
            history_points: 30,
            tick_data_min: 1000,
            tick_data_max: 10_000,
            assumed_ratio: 0.4,
            device_refresh_chance: 0.3,
        }
    }
}

/// One point of the dashboard's ratio history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Unix timestamp in milliseconds
    pub timestamp_ms: i64,
    /// Huffman ratio at this point
    pub huffman: f64,
    /// RLE ratio at this point
    pub rle: f64,
    /// Delta ratio at this point
    pub delta: f64,
    /// LZ77 ratio at this point
    pub lz77: f64,
    /// Bytes processed at this point
    pub data_size: u64,
}

/// Everything the dashboard needs to render one frame
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Ticks elapsed since the session started
    pub tick: u64,
    /// Total bytes processed
    pub total_data_processed: u64,
    /// Total bytes saved
    pub total_data_saved: u64,
    /// Session-wide average ratio
    pub average_compression_ratio: f64,
    /// Engine connection status
    pub connection: ConnectionStatus,
    /// Latest per-algorithm results, provenance-tagged
    pub latest: Option<CompressionResponse>,
    /// Current device roster
    pub devices: Vec<Device>,
    /// Ratio history, oldest first
    pub history: Vec<HistoryPoint>,
}

/// Simulation state and tick logic
///
/// Owns the estimator, metrics, monitor, fleet and history. All
/// mutation happens through [`tick`](Self::tick) and
/// [`compress_custom`](Self::compress_custom); when driven by a
/// [`SimulatorHandle`] those run on a single task, so no locking is
/// involved.
pub struct Simulator {
    config: SimulationConfig,
    engine: Option<EngineClient>,
    estimator: Estimator,
    metrics: SessionMetrics,
    monitor: ConnectionMonitor,
    fleet: DeviceFleet,
    history: VecDeque<HistoryPoint>,
    latest: Option<CompressionResponse>,
    tick: u64,
}

impl Simulator {
    /// Create a simulator with no engine attached
    pub fn new(config: SimulationConfig) -> Self {
        let history = backfill_history(config.history_points);
        Self {
            config,
            engine: None,
            estimator: Estimator::new(),
            metrics: SessionMetrics::new(),
            monitor: ConnectionMonitor::new(),
            fleet: DeviceFleet::generate(),
            history,
            latest: None,
            tick: 0,
        }
    }

    /// Attach an engine client
    pub fn with_engine(mut self, engine: EngineClient) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Replace the estimator (for custom band configurations)
    pub fn with_estimator(mut self, estimator: Estimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Session metrics so far
    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Connection monitor state
    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    /// Current device roster
    pub fn fleet(&self) -> &DeviceFleet {
        &self.fleet
    }

    /// Run one simulation tick
    pub async fn tick(&mut self) -> DashboardSnapshot {
        self.tick += 1;
        let response = self.collect_results().await;

        let mut rng = rand::thread_rng();
        let processed = rng.gen_range(self.config.tick_data_min..self.config.tick_data_max);
        let ratio = response
            .mean_ratio()
            .unwrap_or(self.config.assumed_ratio);

        self.metrics.record_tick(processed, ratio);
        self.metrics.record_results(&response);

        if rng.gen::<f64>() < self.config.device_refresh_chance {
            self.fleet.refresh();
        }

        self.push_history(&response, processed);
        debug!(
            tick = self.tick,
            processed,
            ratio,
            simulated = response.provenance.is_simulated(),
            "simulation tick"
        );
        self.latest = Some(response);
        self.snapshot()
    }

    /// Compress user-supplied data
    ///
    /// Goes through the engine when one is attached; every engine error
    /// is recoverable here, so on failure the estimator takes over and
    /// the response is tagged as simulated.
    pub async fn compress_custom(&mut self, data: &str) -> CompressionResponse {
        match &self.engine {
            Some(client) => match client.compress(data).await {
                Ok(response) => {
                    self.monitor.record_success();
                    response
                }
                Err(e) => {
                    warn!(error = %e, "custom compression fell back to the estimator");
                    self.monitor.record_failure();
                    self.estimator.estimate_all(data)
                }
            },
            None => self.estimator.estimate_all(data),
        }
    }

    /// Probe the engine and fold the outcome into the monitor
    pub async fn probe_engine(&mut self) -> ConnectionStatus {
        if let Some(client) = &self.engine {
            if client.probe().await {
                self.monitor.record_success();
            } else {
                self.monitor.record_failure();
            }
        }
        self.monitor.status()
    }

    /// Assemble a dashboard snapshot from current state
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            tick: self.tick,
            total_data_processed: self.metrics.total_data_processed(),
            total_data_saved: self.metrics.total_data_saved(),
            average_compression_ratio: self.metrics.average_compression_ratio(),
            connection: self.monitor.status(),
            latest: self.latest.clone(),
            devices: self.fleet.devices().to_vec(),
            history: self.history.iter().cloned().collect(),
        }
    }

    async fn collect_results(&mut self) -> CompressionResponse {
        match &self.engine {
            Some(client) => match client.fetch_sample().await {
                Ok(response) => {
                    self.monitor.record_success();
                    response
                }
                Err(e) => {
                    warn!(error = %e, "engine tick failed, falling back to simulation");
                    self.monitor.record_failure();
                    self.simulated_results()
                }
            },
            None => self.simulated_results(),
        }
    }

    /// Estimator-backed results over a synthetic sensor payload
    fn simulated_results(&self) -> CompressionResponse {
        let payload = synth_sensor_payload();
        self.estimator.estimate_all(&payload)
    }

    fn push_history(&mut self, response: &CompressionResponse, data_size: u64) {
        let previous = self.history.back().cloned();
        let ratio_for = |algorithm: Algorithm, carried: Option<f64>| {
            response
                .result_for(algorithm)
                .map(|r| r.compression_ratio)
                .or(carried)
                .unwrap_or(self.config.assumed_ratio)
        };

        let point = HistoryPoint {
            timestamp_ms: Utc::now().timestamp_millis(),
            huffman: ratio_for(Algorithm::Huffman, previous.as_ref().map(|p| p.huffman)),
            rle: ratio_for(Algorithm::Rle, previous.as_ref().map(|p| p.rle)),
            delta: ratio_for(Algorithm::Delta, previous.as_ref().map(|p| p.delta)),
            lz77: ratio_for(Algorithm::Lz77, previous.as_ref().map(|p| p.lz77)),
            data_size,
        };

        if self.history.len() >= self.config.history_points {
            self.history.pop_front();
        }
        self.history.push_back(point);
    }
}

/// Synthetic comma-separated sensor readings
///
/// Numeric-heavy on purpose: it exercises the same estimator paths the
/// dashboard's live IoT payloads would.
fn synth_sensor_payload() -> String {
    let mut rng = rand::thread_rng();
    let count = rng.gen_range(20..60);
    let base: f64 = rng.gen_range(15.0..30.0);

    let mut payload = String::new();
    for i in 0..count {
        if i > 0 {
            payload.push(',');
        }
        let reading = base + rng.gen_range(-0.5..0.5);
        payload.push_str(&format!("{:.1}", reading));
    }
    payload
}

/// Seed history so the dashboard chart starts populated
fn backfill_history(points: usize) -> VecDeque<HistoryPoint> {
    let mut rng = rand::thread_rng();
    let now = Utc::now().timestamp_millis();
    const MINUTE_MS: i64 = 60_000;

    (0..points)
        .map(|i| HistoryPoint {
            timestamp_ms: now - (points as i64 - i as i64) * MINUTE_MS,
            huffman: 1.0 - rng.gen_range(0.2..0.5),
            rle: 1.0 - rng.gen_range(0.4..0.7),
            delta: 1.0 - rng.gen_range(0.3..0.6),
            lz77: 1.0 - rng.gen_range(0.25..0.5),
            data_size: rng.gen_range(1000..10_000),
        })
        .collect()
}

/// Interval setting for the driver task; `None` is the stopped sentinel
pub type IntervalSetting = Option<Duration>;

/// Handle to a running simulation task
///
/// Dropping the handle stops the task (the watch channels close and the
/// loop exits); prefer [`stop`](Self::stop) to get the simulator back.
pub struct SimulatorHandle {
    interval_tx: watch::Sender<IntervalSetting>,
    snapshot_rx: watch::Receiver<DashboardSnapshot>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<Simulator>,
}

impl SimulatorHandle {
    /// Spawn the driver task for a simulator
    ///
    /// The first tick runs immediately, then one per configured interval.
    pub fn spawn(simulator: Simulator) -> Self {
        let initial = simulator.config.update_interval;
        let (interval_tx, interval_rx) = watch::channel(Some(initial));
        let (snapshot_tx, snapshot_rx) = watch::channel(DashboardSnapshot::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(drive(simulator, interval_rx, snapshot_tx, shutdown_rx));

        Self {
            interval_tx,
            snapshot_rx,
            shutdown_tx,
            task,
        }
    }

    /// Change the tick interval; also resumes a paused simulation
    pub fn set_interval(&self, interval: Duration) {
        let _ = self.interval_tx.send(Some(interval));
    }

    /// Stop ticking without tearing the task down
    ///
    /// Cancels any pending (not yet started) tick; a tick already in
    /// flight finishes first.
    pub fn pause(&self) {
        let _ = self.interval_tx.send(None);
    }

    /// Whether the simulation is currently paused
    pub fn is_paused(&self) -> bool {
        self.interval_tx.borrow().is_none()
    }

    /// Subscribe to dashboard snapshots
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Most recently published snapshot
    pub fn latest_snapshot(&self) -> DashboardSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop the task and recover the simulator
    pub async fn stop(self) -> Option<Simulator> {
        let _ = self.shutdown_tx.send(true);
        match self.task.await {
            Ok(simulator) => Some(simulator),
            Err(e) => {
                warn!(error = %e, "simulation task did not shut down cleanly");
                None
            }
        }
    }
}

/// Driver loop: single mutator of the simulator, single engine call in
/// flight at any time
async fn drive(
    mut simulator: Simulator,
    mut interval_rx: watch::Receiver<IntervalSetting>,
    snapshot_tx: watch::Sender<DashboardSnapshot>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Simulator {
    info!("simulation driver started");
    loop {
        let setting = *interval_rx.borrow_and_update();
        match setting {
            Some(period) => {
                let mut ticker = tokio::time::interval(period);
                // A tick stalled on the engine must delay, not stack
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let snapshot = simulator.tick().await;
                            let _ = snapshot_tx.send(snapshot);
                        }
                        changed = interval_rx.changed() => {
                            if changed.is_err() {
                                info!("simulation driver detached, stopping");
                                return simulator;
                            }
                            // Re-read the setting; drops the pending tick
                            break;
                        }
                        _ = shutdown_rx.changed() => {
                            info!("simulation driver stopped");
                            return simulator;
                        }
                    }
                }
            }
            None => {
                debug!("simulation paused");
                tokio::select! {
                    changed = interval_rx.changed() => {
                        if changed.is_err() {
                            return simulator;
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        return simulator;
                    }
                }
            }
        }
    }
}
