//! # CREST - Compression Ratio Estimation and Simulation Toolkit
//!
//! A metrics engine for IoT compression dashboards: estimates how the
//! classical algorithms would perform on arbitrary input, keeps every
//! reported ratio internally consistent, and drives the periodic
//! simulation that feeds the dashboard.
//!
//! ## Key Features
//!
//! - **Feature-based Estimation**: Huffman/Delta outcomes derived
//!   deterministically from input structure
//! - **Canonical Ratios**: every ratio recomputed from sizes, clamped and
//!   rounded in one place
//! - **Honest Provenance**: engine results and simulated fallbacks are
//!   never conflated
//! - **Bounded Engine Calls**: the external compressor is optional,
//!   timeout-guarded, and never called concurrently per session
//!
//! ## Quick Start
//!
//! ```rust
//! use crest::{Algorithm, Estimator};
//!
//! let estimator = Estimator::new();
//! let response = estimator
//!     .estimate("aaaaaaaaaa", &[Algorithm::Huffman, Algorithm::Delta])
//!     .unwrap();
//!
//! // Ten identical bytes: high repetition, strong Huffman estimate
//! let huffman = response.result_for(Algorithm::Huffman).unwrap();
//! assert_eq!(huffman.compression_ratio, 0.60);
//! assert_eq!(huffman.compressed_size, 32); // bits
//! assert!(response.provenance.is_simulated());
//! ```
//!
//! ## Modules
//!
//! - [`protocol`]: Algorithm set, results, provenance
//! - [`estimator`]: Feature extraction and outcome estimation
//! - [`normalizer`]: Canonical ratio computation
//! - [`metrics`]: Session-wide totals and averages
//! - [`engine`]: Adapter for the external compression engine
//! - [`monitor`]: Engine connectivity tracking
//! - [`devices`]: Simulated IoT device fleet
//! - [`simulation`]: Periodic tick driver

// Modules
pub mod devices;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod monitor;
pub mod normalizer;
pub mod protocol;
pub mod simulation;

// Re-exports for convenient access
pub use devices::{Device, DeviceFleet, DeviceKind, DeviceStatus, FleetConfig};
pub use engine::{EngineClient, EngineConfig};
pub use error::{CrestError, EngineError, EstimateError, NormalizeError, Result};
pub use estimator::{BandRatios, Estimator, EstimatorConfig, InputProfile, RepetitionBand};
pub use metrics::SessionMetrics;
pub use monitor::{ConnectionMonitor, ConnectionStatus, MonitorConfig};
pub use normalizer::{normalize, normalize_or_zero, normalize_response, RATIO_DECIMALS};
pub use protocol::{
    parse_algorithm_set, Algorithm, CompressionResponse, CompressionResult, Provenance,
};
pub use simulation::{
    DashboardSnapshot, HistoryPoint, SimulationConfig, Simulator, SimulatorHandle,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default base address of the external compression engine
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8081";

/// Default timeout for engine requests, in milliseconds
pub const DEFAULT_ENGINE_TIMEOUT_MS: u64 = 3000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_basic_pipeline() {
        let estimator = Estimator::new();
        let response = estimator.estimate("1234567890", &Algorithm::ALL).unwrap();
        assert_eq!(response.results.len(), 4);

        let mut metrics = SessionMetrics::new();
        let ratio = response.mean_ratio().unwrap();
        metrics.record_tick(response.original_size, ratio);

        assert_eq!(metrics.total_data_processed(), 10);
        assert!(!metrics.average_compression_ratio().is_nan());
    }
}
