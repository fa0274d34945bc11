// CREST - Compression Ratio Estimation and Simulation Toolkit
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Compression-outcome estimation
//!
//! This module predicts how the classical algorithms would perform on a
//! given input without executing them. Structural features of the input
//! (distinct-symbol ratio, numeric-content ratio) select a base ratio per
//! algorithm; sizes and the final ratio are then derived through the
//! normalizer so estimates are always internally consistent.
//!
//! Huffman and Delta estimates are a pure function of the input bytes.
//! RLE and LZ77 have no feature rule; their ratios are drawn uniformly
//! from a configured range and are non-deterministic, as is the time
//! field on every entry. Responses are always tagged
//! [`Provenance::Simulated`].

use rand::Rng;

use crate::error::EstimateError;
use crate::normalizer;
use crate::protocol::{
    validate_algorithm_set, Algorithm, CompressionResponse, CompressionResult, Provenance,
};

/// Repetition level of an input, derived from its distinct-symbol ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionBand {
    /// Few distinct symbols relative to length (ratio < 0.3)
    High,
    /// Moderate symbol variety (ratio < 0.5)
    Medium,
    /// Mostly distinct symbols
    Low,
}

/// Structural features extracted from an input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputProfile {
    /// Input length in bytes
    pub length: usize,
    /// Distinct symbols / length; 1.0 for empty input
    pub distinct_ratio: f64,
    /// Decimal digits / length; 0.0 for empty input
    pub numeric_ratio: f64,
}

impl InputProfile {
    /// Analyze an input buffer
    ///
    /// Empty input yields `distinct_ratio = 1.0` (no compressible
    /// repetition) and `numeric_ratio = 0.0`; analysis never fails.
    pub fn analyze(input: &[u8]) -> Self {
        if input.is_empty() {
            return Self {
                length: 0,
                distinct_ratio: 1.0,
                numeric_ratio: 0.0,
            };
        }

        let mut seen = [false; 256];
        let mut distinct = 0usize;
        let mut digits = 0usize;
        for &byte in input {
            if !seen[byte as usize] {
                seen[byte as usize] = true;
                distinct += 1;
            }
            if byte.is_ascii_digit() {
                digits += 1;
            }
        }

        let length = input.len();
        Self {
            length,
            distinct_ratio: distinct as f64 / length as f64,
            numeric_ratio: digits as f64 / length as f64,
        }
    }

    /// Band this profile's distinct-symbol ratio
    pub fn band(&self) -> RepetitionBand {
        if self.distinct_ratio < 0.3 {
            RepetitionBand::High
        } else if self.distinct_ratio < 0.5 {
            RepetitionBand::Medium
        } else {
            RepetitionBand::Low
        }
    }
}

/// Base ratios for one algorithm across the repetition bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRatios {
    /// Ratio for highly repetitive input
    pub high: f64,
    /// Ratio for moderately repetitive input
    pub medium: f64,
    /// Ratio for low-repetition input
    pub low: f64,
}

impl BandRatios {
    /// Select the ratio for a band
    pub fn for_band(&self, band: RepetitionBand) -> f64 {
        match band {
            RepetitionBand::High => self.high,
            RepetitionBand::Medium => self.medium,
            RepetitionBand::Low => self.low,
        }
    }
}

/// Configuration for the estimator
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Huffman base ratios per band
    pub huffman: BandRatios,
    /// Delta base ratios per band
    pub delta: BandRatios,
    /// Numeric-content ratio above which delta gets its bonus (default: 0.5)
    pub numeric_threshold: f64,
    /// Flat bonus added to delta's ratio for numeric-heavy input (default: 0.20)
    pub numeric_bonus: f64,
    /// Lower bound of the simulated ratio range for RLE/LZ77 (default: 0.1)
    pub simulated_ratio_min: f64,
    /// Upper bound of the simulated ratio range for RLE/LZ77 (default: 0.9)
    pub simulated_ratio_max: f64,
    /// Lower bound of the simulated time range in ms (default: 1.0)
    pub time_min_ms: f64,
    /// Upper bound of the simulated time range in ms (default: 20.0)
    pub time_max_ms: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            huffman: BandRatios {
                high: 0.60,
                medium: 0.40,
                low: 0.25,
            },
            delta: BandRatios {
                high: 0.45,
                medium: 0.30,
                low: 0.15,
            },
            numeric_threshold: 0.5,
            numeric_bonus: 0.20,
            simulated_ratio_min: 0.1,
            simulated_ratio_max: 0.9,
            time_min_ms: 1.0,
            time_max_ms: 20.0,
        }
    }
}

/// Estimates compression outcomes from input features
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    /// Create a new estimator with default configuration
    pub fn new() -> Self {
        Self {
            config: EstimatorConfig::default(),
        }
    }

    /// Create an estimator with custom configuration
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Get current configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate outcomes for a requested algorithm set
    ///
    /// Returns one result per algorithm, in request order. Fails when the
    /// set is empty or contains duplicates; never fails on empty input.
    pub fn estimate(
        &self,
        input: &str,
        algorithms: &[Algorithm],
    ) -> Result<CompressionResponse, EstimateError> {
        validate_algorithm_set(algorithms)?;

        let profile = InputProfile::analyze(input.as_bytes());
        let original_size = profile.length as u64;

        let results = algorithms
            .iter()
            .map(|&algorithm| self.estimate_one(&profile, original_size, algorithm))
            .collect();

        Ok(CompressionResponse {
            original_size,
            original_data: input.to_string(),
            results,
            provenance: Provenance::Simulated,
        })
    }

    /// Estimate outcomes for every known algorithm
    ///
    /// Infallible convenience for the simulation path: the full set is
    /// non-empty and duplicate-free by construction.
    pub fn estimate_all(&self, input: &str) -> CompressionResponse {
        let profile = InputProfile::analyze(input.as_bytes());
        let original_size = profile.length as u64;

        let results = Algorithm::ALL
            .iter()
            .map(|&algorithm| self.estimate_one(&profile, original_size, algorithm))
            .collect();

        CompressionResponse {
            original_size,
            original_data: input.to_string(),
            results,
            provenance: Provenance::Simulated,
        }
    }

    /// Feature-derived ratio, if a rule exists for this algorithm
    fn feature_ratio(&self, profile: &InputProfile, algorithm: Algorithm) -> Option<f64> {
        let band = profile.band();
        match algorithm {
            Algorithm::Huffman => Some(self.config.huffman.for_band(band)),
            Algorithm::Delta => {
                let mut ratio = self.config.delta.for_band(band);
                if profile.numeric_ratio > self.config.numeric_threshold {
                    // Delta encoding favors numeric sequences
                    ratio += self.config.numeric_bonus;
                }
                Some(ratio)
            }
            // No feature rule; the simulated range applies
            Algorithm::Rle | Algorithm::Lz77 => None,
        }
    }

    fn estimate_one(
        &self,
        profile: &InputProfile,
        original_size: u64,
        algorithm: Algorithm,
    ) -> CompressionResult {
        let mut rng = rand::thread_rng();

        let target_ratio = self
            .feature_ratio(profile, algorithm)
            .unwrap_or_else(|| {
                rng.gen_range(self.config.simulated_ratio_min..self.config.simulated_ratio_max)
            })
            .clamp(0.0, 1.0);

        // Retained fraction of the input, expressed in bits
        let compressed_size = (original_size as f64 * (1.0 - target_ratio) * 8.0).floor() as u64;

        // The reported ratio goes through the normalizer like every other
        // result, so it is consistent with the sizes by construction
        let compression_ratio =
            normalizer::normalize_or_zero(original_size * 8, compressed_size as i64);

        let compression_time_ms = rng.gen_range(self.config.time_min_ms..self.config.time_max_ms);

        CompressionResult {
            algorithm,
            original_size,
            compressed_size,
            compression_ratio,
            compression_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_empty_input() {
        let profile = InputProfile::analyze(b"");
        assert_eq!(profile.length, 0);
        assert_relative_eq!(profile.distinct_ratio, 1.0);
        assert_relative_eq!(profile.numeric_ratio, 0.0);
        assert_eq!(profile.band(), RepetitionBand::Low);
    }

    #[test]
    fn test_profile_repeated_input() {
        let profile = InputProfile::analyze(b"aaaaaaaaaa");
        assert_relative_eq!(profile.distinct_ratio, 0.1);
        assert_relative_eq!(profile.numeric_ratio, 0.0);
        assert_eq!(profile.band(), RepetitionBand::High);
    }

    #[test]
    fn test_profile_numeric_input() {
        let profile = InputProfile::analyze(b"1234567890");
        assert_relative_eq!(profile.distinct_ratio, 1.0);
        assert_relative_eq!(profile.numeric_ratio, 1.0);
        assert_eq!(profile.band(), RepetitionBand::Low);
    }

    #[test]
    fn test_profile_band_boundaries() {
        // Exactly 0.3 distinct: the high band is strictly below 0.3
        let profile = InputProfile::analyze(b"aaaabbbbcc");
        assert_relative_eq!(profile.distinct_ratio, 0.3);
        assert_eq!(profile.band(), RepetitionBand::Medium);

        // Exactly 0.5 distinct: the medium band is strictly below 0.5
        let profile = InputProfile::analyze(b"aabbccddee");
        assert_relative_eq!(profile.distinct_ratio, 0.5);
        assert_eq!(profile.band(), RepetitionBand::Low);
    }

    #[test]
    fn test_estimate_repeated_scenario() {
        // 10 identical chars: high repetition band
        let estimator = Estimator::new();
        let response = estimator
            .estimate("aaaaaaaaaa", &[Algorithm::Huffman, Algorithm::Delta])
            .unwrap();

        let huffman = response.result_for(Algorithm::Huffman).unwrap();
        assert_relative_eq!(huffman.compression_ratio, 0.60);
        assert_eq!(huffman.compressed_size, 32); // floor(10 * 0.40 * 8)

        let delta = response.result_for(Algorithm::Delta).unwrap();
        assert_relative_eq!(delta.compression_ratio, 0.45);
        assert_eq!(delta.compressed_size, 44); // floor(10 * 0.55 * 8)
    }

    #[test]
    fn test_estimate_numeric_scenario() {
        // All digits, all distinct: low band plus the delta bonus
        let estimator = Estimator::new();
        let response = estimator
            .estimate("1234567890", &[Algorithm::Huffman, Algorithm::Delta])
            .unwrap();

        let huffman = response.result_for(Algorithm::Huffman).unwrap();
        assert_relative_eq!(huffman.compression_ratio, 0.25);

        let delta = response.result_for(Algorithm::Delta).unwrap();
        assert_relative_eq!(delta.compression_ratio, 0.35);
        assert_eq!(delta.compressed_size, 52); // floor(10 * 0.65 * 8)
    }

    #[test]
    fn test_estimate_empty_input() {
        let estimator = Estimator::new();
        let response = estimator
            .estimate("", &[Algorithm::Huffman, Algorithm::Delta])
            .unwrap();

        assert_eq!(response.original_size, 0);
        for result in &response.results {
            assert_eq!(result.compressed_size, 0);
            assert_relative_eq!(result.compression_ratio, 0.0);
        }
    }

    #[test]
    fn test_estimate_deterministic_for_feature_algorithms() {
        let estimator = Estimator::new();
        let input = "sensor-22.5,sensor-22.6,sensor-22.7";

        let first = estimator
            .estimate(input, &[Algorithm::Huffman, Algorithm::Delta])
            .unwrap();
        let second = estimator
            .estimate(input, &[Algorithm::Huffman, Algorithm::Delta])
            .unwrap();

        for (a, b) in first.results.iter().zip(second.results.iter()) {
            assert_eq!(a.compression_ratio, b.compression_ratio);
            assert_eq!(a.compressed_size, b.compressed_size);
        }
    }

    #[test]
    fn test_estimate_request_order_preserved() {
        let estimator = Estimator::new();
        let response = estimator
            .estimate("abc", &[Algorithm::Delta, Algorithm::Huffman])
            .unwrap();
        assert_eq!(response.results[0].algorithm, Algorithm::Delta);
        assert_eq!(response.results[1].algorithm, Algorithm::Huffman);
    }

    #[test]
    fn test_estimate_empty_algorithm_set() {
        let estimator = Estimator::new();
        assert_eq!(
            estimator.estimate("abc", &[]).unwrap_err(),
            EstimateError::EmptyAlgorithmSet
        );
    }

    #[test]
    fn test_estimate_duplicate_algorithm() {
        let estimator = Estimator::new();
        let err = estimator
            .estimate("abc", &[Algorithm::Rle, Algorithm::Rle])
            .unwrap_err();
        assert!(matches!(err, EstimateError::DuplicateAlgorithm { .. }));
    }

    #[test]
    fn test_simulated_ratio_range() {
        let estimator = Estimator::new();
        for _ in 0..50 {
            let response = estimator
                .estimate("some payload", &[Algorithm::Rle, Algorithm::Lz77])
                .unwrap();
            for result in &response.results {
                assert!(
                    (0.0..=1.0).contains(&result.compression_ratio),
                    "ratio {} out of range",
                    result.compression_ratio
                );
            }
        }
    }

    #[test]
    fn test_time_range() {
        let estimator = Estimator::new();
        for _ in 0..50 {
            let response = estimator.estimate_all("payload");
            for result in &response.results {
                assert!(
                    result.compression_time_ms >= 1.0 && result.compression_time_ms < 20.0,
                    "time {} out of range",
                    result.compression_time_ms
                );
            }
        }
    }

    #[test]
    fn test_bonus_clamped() {
        // A config whose bonus pushes past 1.0 must still clamp
        let config = EstimatorConfig {
            numeric_bonus: 2.0,
            ..EstimatorConfig::default()
        };
        let estimator = Estimator::with_config(config);
        let response = estimator.estimate("1234567890", &[Algorithm::Delta]).unwrap();
        let delta = response.result_for(Algorithm::Delta).unwrap();
        assert_relative_eq!(delta.compression_ratio, 1.0);
        assert_eq!(delta.compressed_size, 0);
    }

    #[test]
    fn test_estimate_all_is_simulated() {
        let estimator = Estimator::new();
        let response = estimator.estimate_all("abc");
        assert!(response.provenance.is_simulated());
        assert_eq!(response.results.len(), Algorithm::ALL.len());
    }
}
