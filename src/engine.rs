// CREST - Compression Ratio Estimation and Simulation Toolkit
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Adapter for the external compression engine
//!
//! The engine is an HTTP collaborator that actually runs the algorithms.
//! This adapter owns the conformance work: bounded timeouts, response
//! shape validation, and ratio re-derivation through the normalizer.
//! It never fabricates results; on failure the error propagates and the
//! simulation layer decides whether to fall back to the estimator.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::normalizer;
use crate::protocol::{Algorithm, CompressionResponse, CompressionResult, Provenance};
use crate::{DEFAULT_ENGINE_TIMEOUT_MS, DEFAULT_ENGINE_URL};

/// Configuration for the engine client
///
/// An explicit value owned by the caller; there is no process-wide
/// singleton.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base address of the engine, e.g. `http://localhost:8081`
    pub base_url: String,
    /// Overall request timeout (default: 3 s)
    pub timeout: Duration,
    /// TCP connect timeout (default: 3 s)
    pub connect_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_ENGINE_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_ENGINE_TIMEOUT_MS),
        }
    }
}

/// HTTP client for the external compression engine
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

/// Request body for `/api/compress/custom`
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    data: &'a str,
}

/// Engine response envelope as it appears on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    original_size: u64,
    #[serde(default)]
    original_data: Option<String>,
    results: Vec<WireResult>,
}

/// One wire result entry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    algorithm: String,
    /// Bit-valued size as reported; sign unconstrained at this boundary
    compressed_size: i64,
    /// Reported ratio; decoded but never trusted
    #[allow(dead_code)]
    #[serde(default)]
    compression_ratio: Option<f64>,
    #[serde(default)]
    compression_time: Option<f64>,
}

impl EngineClient {
    /// Create a client from configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| EngineError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    /// Create a client for a base address with default timeouts
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, EngineError> {
        Self::new(EngineConfig {
            base_url: base_url.into(),
            ..EngineConfig::default()
        })
    }

    /// Base address this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Connectivity probe
    ///
    /// `GET /`; a 2xx answer means reachable, any other outcome
    /// (including timeout) means unreachable.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => {
                let reachable = response.status().is_success();
                debug!(status = %response.status(), reachable, "engine probe");
                reachable
            }
            Err(e) => {
                debug!(error = %e, "engine probe failed");
                false
            }
        }
    }

    /// Fetch results for the engine's default sample payload
    pub async fn fetch_sample(&self) -> Result<CompressionResponse, EngineError> {
        let url = format!("{}/api/compress", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        self.decode(response, None).await
    }

    /// Submit custom data for compression
    pub async fn compress(&self, data: &str) -> Result<CompressionResponse, EngineError> {
        let url = format!("{}/api/compress/custom", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&WireRequest { data })
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        self.decode(response, Some(data)).await
    }

    async fn decode(
        &self,
        response: reqwest::Response,
        submitted: Option<&str>,
    ) -> Result<CompressionResponse, EngineError> {
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "engine returned error status");
            return Err(EngineError::Status {
                status: status.as_u16(),
            });
        }

        let wire: WireResponse =
            response
                .json()
                .await
                .map_err(|e| EngineError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        wire_to_response(wire, submitted)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> EngineError {
        if error.is_timeout() {
            EngineError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            EngineError::Unreachable {
                reason: error.to_string(),
            }
        }
    }
}

/// Validate a wire response and convert it into the domain model
///
/// Ratios are re-derived from the reported sizes (original bytes against
/// compressed bits); a zero-byte original reports ratio 0. The result is
/// tagged [`Provenance::Engine`].
fn wire_to_response(
    wire: WireResponse,
    submitted: Option<&str>,
) -> Result<CompressionResponse, EngineError> {
    if wire.results.is_empty() {
        return Err(EngineError::MalformedResponse {
            reason: "empty results".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(wire.results.len());

    for entry in wire.results {
        let algorithm = Algorithm::from_tag(&entry.algorithm).ok_or_else(|| {
            EngineError::MalformedResponse {
                reason: format!("unknown algorithm tag: {}", entry.algorithm),
            }
        })?;
        if !seen.insert(algorithm) {
            return Err(EngineError::MalformedResponse {
                reason: format!("duplicate algorithm: {}", algorithm),
            });
        }

        // Original is byte-valued on the wire, compressed is bit-valued
        let compression_ratio =
            normalizer::normalize_or_zero(wire.original_size.saturating_mul(8), entry.compressed_size);

        results.push(CompressionResult {
            algorithm,
            original_size: wire.original_size,
            compressed_size: entry.compressed_size.max(0) as u64,
            compression_ratio,
            compression_time_ms: entry.compression_time.unwrap_or(0.0).max(0.0),
        });
    }

    let original_data = wire
        .original_data
        .or_else(|| submitted.map(str::to_string))
        .unwrap_or_default();

    Ok(CompressionResponse {
        original_size: wire.original_size,
        original_data,
        results,
        provenance: Provenance::Engine,
    })
}
