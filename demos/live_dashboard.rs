//! Live dashboard simulation example
//!
//! Spawns the simulation driver, watches a few snapshots arrive, slows
//! the tick rate down, then stops the driver and prints the final
//! session report.
//!
//! Run with: `cargo run --example live_dashboard`

use std::time::Duration;

use crest::{SimulationConfig, Simulator, SimulatorHandle};

#[tokio::main]
async fn main() {
    println!("=== CREST Live Dashboard Demo ===\n");

    let config = SimulationConfig {
        update_interval: Duration::from_millis(500),
        ..SimulationConfig::default()
    };

    let handle = SimulatorHandle::spawn(Simulator::new(config));
    let mut snapshots = handle.subscribe();

    for _ in 0..5 {
        if snapshots.changed().await.is_err() {
            break;
        }
        let snapshot = snapshots.borrow_and_update().clone();
        println!(
            "tick {:3}  processed {:8} B  saved {:8} B  avg {:5.1}%  devices {}/{} active",
            snapshot.tick,
            snapshot.total_data_processed,
            snapshot.total_data_saved,
            snapshot.average_compression_ratio * 100.0,
            snapshot
                .devices
                .iter()
                .filter(|d| d.status == crest::DeviceStatus::Active)
                .count(),
            snapshot.devices.len()
        );
    }

    println!("\nslowing down to 1s ticks...");
    handle.set_interval(Duration::from_secs(1));

    for _ in 0..2 {
        if snapshots.changed().await.is_err() {
            break;
        }
        let snapshot = snapshots.borrow_and_update().clone();
        println!("tick {:3}", snapshot.tick);
    }

    if let Some(simulator) = handle.stop().await {
        println!("\n{}", simulator.metrics().report());
        println!("{}", simulator.monitor().report());
    }
}
