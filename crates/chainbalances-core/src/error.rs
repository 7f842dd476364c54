//! Error types for the ChainBalances pipeline.
//!
//! Per-target lookup failures are not errors at this level; they live in
//! [`crate::LookupFailure`] and travel inside the batch.

use thiserror::Error;

use crate::types::{CodecVariant, LookupFailure};

/// Malformed input handed to a codec's decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Expected total length must be at least 1 (the native balance)")]
    TotalLengthZero,

    #[error("Expected total length {total} is too large to decode into")]
    TotalTooLarge { total: usize },

    #[error("Wire sequence is empty but the skip-header format always carries the native entry")]
    MissingNativeEntry,

    #[error("Invalid header 0x{header:04x} at entry {index}")]
    InvalidHeader { index: usize, header: u16 },

    #[error("Entry {index} expands to {implied} balances, exceeding the expected total of {total}")]
    LengthOverflow {
        index: usize,
        total: usize,
        implied: usize,
    },

    #[error("Wire sequence was produced by the {got} codec, cannot decode with {expected}")]
    VariantMismatch {
        expected: CodecVariant,
        got: CodecVariant,
    },
}

/// Errors that abort a whole collection call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    /// The native balance could not be read.
    #[error("Native balance lookup failed: {0}")]
    Native(LookupFailure),

    #[error("Batch of {count} tokens exceeds the configured maximum of {max}")]
    TooManyTargets { count: usize, max: usize },
}

/// Errors from loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}
