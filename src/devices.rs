//! Simulated IoT device fleet
//!
//! The dashboard shows a small fleet of devices alongside compression
//! metrics. Devices here are entirely simulated: a fixed roster whose
//! status, data rates and last-seen timestamps churn over time.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use serde::Serialize;

/// Kind of simulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceKind {
    /// Environmental or telemetry sensor
    Sensor,
    /// Actuator controller
    Controller,
    /// Edge gateway
    Gateway,
    /// Camera node
    Camera,
}

impl DeviceKind {
    /// All kinds, in roster order
    pub const ALL: [DeviceKind; 4] = [
        DeviceKind::Sensor,
        DeviceKind::Controller,
        DeviceKind::Gateway,
        DeviceKind::Camera,
    ];

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Sensor => "Sensor",
            DeviceKind::Controller => "Controller",
            DeviceKind::Gateway => "Gateway",
            DeviceKind::Camera => "Camera",
        }
    }
}

/// Activity status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Device is reporting data
    Active,
    /// Device has gone quiet
    Inactive,
}

/// One simulated device
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Stable identifier, `device-1` onwards
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Device kind
    pub kind: DeviceKind,
    /// Current activity status
    pub status: DeviceStatus,
    /// Reported data rate in KB/s
    pub data_rate_kbps: u32,
    /// When the device last reported
    pub last_seen: DateTime<Utc>,
}

/// Fleet configuration
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Number of devices in the roster (default: 8)
    pub device_count: usize,
    /// Chance a device is inactive when the roster is generated (default: 0.2)
    pub initial_inactive_chance: f64,
    /// Chance a device is inactive after a refresh (default: 0.1)
    pub refresh_inactive_chance: f64,
    /// Minimum data rate in KB/s (default: 10)
    pub data_rate_min: u32,
    /// Maximum data rate in KB/s, exclusive (default: 100)
    pub data_rate_max: u32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            device_count: 8,
            initial_inactive_chance: 0.2,
            refresh_inactive_chance: 0.1,
            data_rate_min: 10,
            data_rate_max: 100,
        }
    }
}

/// Roster of simulated devices
#[derive(Debug)]
pub struct DeviceFleet {
    devices: Vec<Device>,
    config: FleetConfig,
}

impl DeviceFleet {
    /// Generate a fleet with default configuration
    pub fn generate() -> Self {
        Self::with_config(FleetConfig::default())
    }

    /// Generate a fleet with custom configuration
    pub fn with_config(config: FleetConfig) -> Self {
        let mut rng = rand::thread_rng();
        let now = Utc::now();

        let devices = (0..config.device_count)
            .map(|i| {
                let kind = DeviceKind::ALL[i % DeviceKind::ALL.len()];
                let status = if rng.gen::<f64>() < config.initial_inactive_chance {
                    DeviceStatus::Inactive
                } else {
                    DeviceStatus::Active
                };
                Device {
                    id: format!("device-{}", i + 1),
                    name: format!("IoT {} {}", kind.as_str(), i + 1),
                    kind,
                    status,
                    data_rate_kbps: rng.gen_range(config.data_rate_min..config.data_rate_max),
                    // Scatter last-seen over the previous minute
                    last_seen: now - ChronoDuration::milliseconds(rng.gen_range(0..60_000)),
                }
            })
            .collect();

        Self { devices, config }
    }

    /// Current roster
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Number of active devices
    pub fn active_count(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.status == DeviceStatus::Active)
            .count()
    }

    /// Re-roll status, data rate and last-seen for every device
    pub fn refresh(&mut self) {
        let mut rng = rand::thread_rng();
        let now = Utc::now();

        for device in &mut self.devices {
            device.status = if rng.gen::<f64>() < self.config.refresh_inactive_chance {
                DeviceStatus::Inactive
            } else {
                DeviceStatus::Active
            };
            device.data_rate_kbps =
                rng.gen_range(self.config.data_rate_min..self.config.data_rate_max);
            device.last_seen = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_roster() {
        let fleet = DeviceFleet::generate();
        assert_eq!(fleet.devices().len(), 8);

        for (i, device) in fleet.devices().iter().enumerate() {
            assert_eq!(device.id, format!("device-{}", i + 1));
            assert_eq!(device.kind, DeviceKind::ALL[i % 4]);
            assert!(device.data_rate_kbps >= 10 && device.data_rate_kbps < 100);
            assert!(device.last_seen <= Utc::now());
        }
    }

    #[test]
    fn test_kinds_cycle() {
        let fleet = DeviceFleet::with_config(FleetConfig {
            device_count: 5,
            ..FleetConfig::default()
        });
        assert_eq!(fleet.devices()[0].kind, DeviceKind::Sensor);
        assert_eq!(fleet.devices()[4].kind, DeviceKind::Sensor);
    }

    #[test]
    fn test_refresh_updates_last_seen() {
        let mut fleet = DeviceFleet::generate();
        let before = Utc::now();
        fleet.refresh();

        for device in fleet.devices() {
            assert!(device.last_seen >= before);
        }
    }

    #[test]
    fn test_active_count_bounded() {
        let fleet = DeviceFleet::generate();
        assert!(fleet.active_count() <= fleet.devices().len());
    }

    #[test]
    fn test_all_inactive_config() {
        let fleet = DeviceFleet::with_config(FleetConfig {
            initial_inactive_chance: 1.0,
            ..FleetConfig::default()
        });
        assert_eq!(fleet.active_count(), 0);
    }

    #[test]
    fn test_device_serializes_camel_case() {
        let fleet = DeviceFleet::generate();
        let json = serde_json::to_string(&fleet.devices()[0]).unwrap();
        assert!(json.contains("\"dataRateKbps\""));
        assert!(json.contains("\"lastSeen\""));
    }
}
