//! Session metrics for dashboard display
//!
//! Append-only accumulator over compression ticks. The two counters only
//! ever grow; the average ratio is recomputed from them at read time so
//! it can never drift out of sync with what was recorded.

use std::collections::HashMap;

use crate::protocol::{Algorithm, CompressionResponse};

/// Running totals for a dashboard session
#[derive(Debug, Clone, Default)]
pub struct SessionMetrics {
    /// Total bytes processed across all ticks
    total_data_processed: u64,
    /// Total bytes saved across all ticks
    total_data_saved: u64,
    /// Number of ticks recorded
    tick_count: u64,
    /// How many ticks carried a result for each algorithm
    algorithm_ticks: HashMap<Algorithm, u64>,
}

impl SessionMetrics {
    /// Create a new metrics accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one update tick
    ///
    /// `ratio` is the assumed or observed average compression ratio for
    /// this tick's data; it is clamped to [0, 1] before use. Saved bytes
    /// are `floor(new_data_processed * ratio)`.
    pub fn record_tick(&mut self, new_data_processed: u64, ratio: f64) {
        let ratio = ratio.clamp(0.0, 1.0);
        let saved = (new_data_processed as f64 * ratio).floor() as u64;

        self.total_data_processed += new_data_processed;
        self.total_data_saved += saved;
        self.tick_count += 1;
    }

    /// Record which algorithms a tick's response covered
    pub fn record_results(&mut self, response: &CompressionResponse) {
        for result in &response.results {
            *self.algorithm_ticks.entry(result.algorithm).or_insert(0) += 1;
        }
    }

    /// Total bytes processed so far
    pub fn total_data_processed(&self) -> u64 {
        self.total_data_processed
    }

    /// Total bytes saved so far
    pub fn total_data_saved(&self) -> u64 {
        self.total_data_saved
    }

    /// Number of ticks recorded
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Average compression ratio over the whole session
    ///
    /// Always recomputed as saved/processed, never stored. Reports 0.0
    /// (not NaN) before any data has been processed.
    pub fn average_compression_ratio(&self) -> f64 {
        if self.total_data_processed == 0 {
            return 0.0;
        }
        self.total_data_saved as f64 / self.total_data_processed as f64
    }

    /// Most frequently reported algorithm
    pub fn most_reported_algorithm(&self) -> Option<Algorithm> {
        self.algorithm_ticks
            .iter()
            .max_by_key(|(_, count)| *count)
            .map(|(algorithm, _)| *algorithm)
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a human-readable report
    pub fn report(&self) -> String {
        let mut report = String::new();

        report.push_str("=== CREST Session Metrics ===\n\n");
        report.push_str(&format!("Ticks recorded: {}\n", self.tick_count));
        report.push_str(&format!(
            "Data processed: {} bytes\n",
            self.total_data_processed
        ));
        report.push_str(&format!("Data saved: {} bytes\n", self.total_data_saved));
        report.push_str(&format!(
            "Average compression ratio: {:.1}%\n",
            self.average_compression_ratio() * 100.0
        ));

        if !self.algorithm_ticks.is_empty() {
            report.push_str("\nAlgorithm coverage:\n");
            let mut algorithms: Vec<_> = self.algorithm_ticks.iter().collect();
            algorithms.sort_by(|a, b| b.1.cmp(a.1)); // Sort by count descending
            for (algorithm, count) in algorithms {
                report.push_str(&format!("  {}: {} ticks\n", algorithm, count));
            }
        }

        report
    }
}
