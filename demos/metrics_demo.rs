//! Metrics demonstration example
//!
//! Feeds a batch of inputs through the estimator, folds each outcome
//! into the session metrics, and prints the aggregate report.
//!
//! Run with: `cargo run --example metrics_demo`

use crest::{Algorithm, Estimator, SessionMetrics};

fn main() {
    println!("=== CREST Metrics Demo ===\n");

    let estimator = Estimator::new();
    let mut metrics = SessionMetrics::new();

    let inputs = [
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "22.5,22.6,22.5,22.7,22.6,22.8,22.9,23.0",
        "1234567890123456789012345678901234567890",
        "The quick brown fox jumps over the lazy dog",
        "sensor-a:ok;sensor-b:ok;sensor-c:ok;sensor-d:ok",
    ];

    for input in inputs {
        let response = estimator
            .estimate(input, &[Algorithm::Huffman, Algorithm::Delta])
            .expect("algorithm set is valid");

        println!("input ({} bytes): {:?}", response.original_size, input);
        for result in &response.results {
            println!(
                "  {:8} {:5.1}% reduction, {} bits",
                result.algorithm.to_string(),
                result.compression_ratio * 100.0,
                result.compressed_size
            );
        }

        let ratio = response.mean_ratio().unwrap_or(0.0);
        metrics.record_tick(response.original_size, ratio);
        metrics.record_results(&response);
    }

    println!();
    println!("{}", metrics.report());
}
