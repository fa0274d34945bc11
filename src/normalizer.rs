//! Canonical compression-ratio computation
//!
//! Results sourced from an external engine cannot be trusted to report a
//! ratio consistent with the sizes they report. Every
//! [`CompressionResult`](crate::protocol::CompressionResult), whatever its
//! origin, gets its ratio recomputed here: `1 - compressed/original`,
//! clamped to [0, 1] and rounded to two decimal places.

use crate::error::NormalizeError;
use crate::protocol::{CompressionResponse, CompressionResult};

/// Decimal places kept in a normalized ratio
pub const RATIO_DECIMALS: u32 = 2;

const ROUNDING_SCALE: f64 = 100.0;

/// Compute the canonical ratio for a size pair
///
/// Both sizes must be expressed in the same unit; callers holding a
/// bit-valued compressed size against a byte-valued original convert the
/// original to bits first (see the engine adapter and the estimator).
///
/// `compressed_size` is accepted as a signed value because untrusted
/// sources have been observed reporting anything at all; negative inputs
/// clamp to a ratio of 1.0. Rounding is half-away-from-zero.
///
/// Fails with [`NormalizeError::ZeroOriginalSize`] when `original_size`
/// is zero. Callers that want the empty-input case folded to zero use
/// [`normalize_or_zero`].
pub fn normalize(original_size: u64, compressed_size: i64) -> Result<f64, NormalizeError> {
    if original_size == 0 {
        return Err(NormalizeError::ZeroOriginalSize);
    }

    let raw = 1.0 - (compressed_size as f64 / original_size as f64);
    let clamped = raw.clamp(0.0, 1.0);
    Ok((clamped * ROUNDING_SCALE).round() / ROUNDING_SCALE)
}

/// Like [`normalize`], treating a zero-byte original as fully incompressible
///
/// This is the documented call-site special case for empty input: the
/// ratio reports 0.0 instead of failing.
pub fn normalize_or_zero(original_size: u64, compressed_size: i64) -> f64 {
    normalize(original_size, compressed_size).unwrap_or(0.0)
}

/// Recompute the ratio of a single result in place
pub fn normalize_result(result: &mut CompressionResult) {
    result.compression_ratio =
        normalize_or_zero(result.original_size, result.compressed_size as i64);
}

/// Recompute every ratio in a response in place
///
/// Applied uniformly at the engine boundary and after estimation, so a
/// response never leaves the core with a ratio inconsistent with its
/// sizes.
pub fn normalize_response(response: &mut CompressionResponse) {
    for result in &mut response.results {
        normalize_result(result);
    }
}
