//! Maps raw lookup outcomes into the 240-bit codec domain.

use crate::types::{CodecVariant, RawBalance, RawBatch};
use crate::value::Balance240;

/// Normalize one lookup outcome.
///
/// A success clamps to at most [`Balance240::MAX`], so the sentinel is never
/// produced for a genuine balance. A failure maps to the variant's
/// [`CodecVariant::failure_value`].
pub fn normalize(raw: &RawBalance, variant: CodecVariant) -> Balance240 {
    match raw {
        Ok(value) => Balance240::clamped(*value),
        Err(_) => variant.failure_value(),
    }
}

/// Normalize a whole batch, preserving order.
pub fn normalize_batch(batch: &RawBatch, variant: CodecVariant) -> Vec<Balance240> {
    batch
        .results
        .iter()
        .map(|r| normalize(&r.result, variant))
        .collect()
}
