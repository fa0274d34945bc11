//! Core data model for CREST
//!
//! This module defines the value types shared by the estimator, the
//! normalizer and the engine adapter:
//! - The closed algorithm set
//! - Result provenance (engine vs simulated)
//! - Per-algorithm compression results and the response envelope

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// Compression algorithms known to the dashboard
///
/// Closed set; there is no dynamic extension. Wire names are the
/// lower-case tags used by the external engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Variable-length prefix coding by symbol frequency
    Huffman,
    /// Run-length encoding of repeated symbols
    Rle,
    /// Differences between consecutive values
    Delta,
    /// Dictionary/back-reference compression
    Lz77,
}

impl Algorithm {
    /// All algorithms, in canonical dashboard order
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Huffman,
        Algorithm::Rle,
        Algorithm::Delta,
        Algorithm::Lz77,
    ];

    /// Wire tag for this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Huffman => "huffman",
            Algorithm::Rle => "rle",
            Algorithm::Delta => "delta",
            Algorithm::Lz77 => "lz77",
        }
    }

    /// Parse a wire tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "huffman" => Some(Algorithm::Huffman),
            "rle" => Some(Algorithm::Rle),
            "delta" => Some(Algorithm::Delta),
            "lz77" => Some(Algorithm::Lz77),
            _ => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = EstimateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Algorithm::from_tag(s).ok_or_else(|| EstimateError::UnknownAlgorithm {
            tag: s.to_string(),
        })
    }
}

/// Origin of a result set
///
/// Every response carries this tag so callers can always tell a real
/// engine measurement from a local simulation. Conflating the two was a
/// recurring dashboard defect; the tag makes it impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Measured by the external compression engine
    Engine,
    /// Produced by the local estimator or mock path
    Simulated,
}

impl Provenance {
    /// Check whether this result set is simulated
    pub fn is_simulated(&self) -> bool {
        matches!(self, Provenance::Simulated)
    }
}

/// Estimated or measured outcome for a single algorithm
///
/// `compressed_size` is expressed in **bits**, uniformly, for every
/// algorithm and every source. `compression_ratio` is the fraction of the
/// original eliminated, always recomputed by the normalizer and clamped
/// to [0, 1]. `compression_time_ms` is display-only and non-deterministic
/// for simulated entries; only its range is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionResult {
    /// Algorithm this outcome belongs to
    pub algorithm: Algorithm,
    /// Input size in bytes
    pub original_size: u64,
    /// Output size estimate in bits
    pub compressed_size: u64,
    /// Fraction of the original eliminated, in [0, 1]
    pub compression_ratio: f64,
    /// Time estimate in milliseconds
    pub compression_time_ms: f64,
}

/// Response envelope: one result per requested algorithm
///
/// Invariants: every `algorithm` appears at most once, and `results`
/// preserves caller-request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionResponse {
    /// Size of the submitted input in bytes
    pub original_size: u64,
    /// The exact input submitted
    pub original_data: String,
    /// Per-algorithm outcomes, in request order
    pub results: Vec<CompressionResult>,
    /// Where these numbers came from
    pub provenance: Provenance,
}

impl CompressionResponse {
    /// Look up the result for a specific algorithm
    pub fn result_for(&self, algorithm: Algorithm) -> Option<&CompressionResult> {
        self.results.iter().find(|r| r.algorithm == algorithm)
    }

    /// Mean compression ratio across all results
    pub fn mean_ratio(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        let sum: f64 = self.results.iter().map(|r| r.compression_ratio).sum();
        Some(sum / self.results.len() as f64)
    }
}

/// Parse a set of wire tags into algorithms
///
/// Fails on unknown tags and on duplicates; order is preserved. This is
/// the boundary where stringly-typed requests enter the closed set.
pub fn parse_algorithm_set<S: AsRef<str>>(
    tags: &[S],
) -> std::result::Result<Vec<Algorithm>, EstimateError> {
    if tags.is_empty() {
        return Err(EstimateError::EmptyAlgorithmSet);
    }

    let mut algorithms = Vec::with_capacity(tags.len());
    for tag in tags {
        let algorithm: Algorithm = tag.as_ref().parse()?;
        if algorithms.contains(&algorithm) {
            return Err(EstimateError::DuplicateAlgorithm { algorithm });
        }
        algorithms.push(algorithm);
    }
    Ok(algorithms)
}

/// Check that a requested algorithm set is non-empty and duplicate-free
pub(crate) fn validate_algorithm_set(
    algorithms: &[Algorithm],
) -> std::result::Result<(), EstimateError> {
    if algorithms.is_empty() {
        return Err(EstimateError::EmptyAlgorithmSet);
    }
    for (i, algorithm) in algorithms.iter().enumerate() {
        if algorithms[..i].contains(algorithm) {
            return Err(EstimateError::DuplicateAlgorithm {
                algorithm: *algorithm,
            });
        }
    }
    Ok(())
}
