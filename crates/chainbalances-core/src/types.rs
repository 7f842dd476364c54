//! Core types for the balance collection pipeline.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::value::Balance240;

// ─── CodecVariant ─────────────────────────────────────────────────────────────

/// Which wire format a [`crate::WireSequence`] was produced with.
///
/// The two formats are not self-describing; a consumer must know the variant
/// before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecVariant {
    /// Legacy format: header flag + 15-bit count of skipped zeros.
    /// Failed lookups normalize to zero.
    #[serde(alias = "legacy")]
    SkipHeader,
    /// Improved format: header is the repeat count of the payload.
    /// Failed lookups normalize to [`Balance240::ERROR`].
    #[default]
    #[serde(alias = "improved")]
    RunLength,
}

impl CodecVariant {
    /// The normalized value a failed lookup maps to under this variant.
    pub fn failure_value(&self) -> Balance240 {
        match self {
            Self::SkipHeader => Balance240::ZERO,
            Self::RunLength => Balance240::ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipHeader => "skip-header",
            Self::RunLength => "run-length",
        }
    }
}

impl fmt::Display for CodecVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip-header" | "legacy" | "v1" => Ok(Self::SkipHeader),
            "run-length" | "improved" | "v2" => Ok(Self::RunLength),
            other => Err(format!(
                "unknown codec '{other}' (expected 'legacy' or 'improved')"
            )),
        }
    }
}

// ─── LookupFailure ────────────────────────────────────────────────────────────

/// Why a single token balance lookup failed.
///
/// Failures are recovered inside the batch: they become a failed
/// [`RawBalance`] for their index and never abort sibling lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupFailure {
    /// The balance call reverted.
    #[error("reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Reverted {
        /// Decoded revert reason, if the revert data was recognisable.
        reason: Option<String>,
        /// Raw revert data as returned by the node.
        data: Vec<u8>,
    },

    /// The target address has no deployed code.
    #[error("target has no deployed code")]
    NoCode,

    /// The call succeeded but did not return a 32-byte balance.
    #[error("malformed balance return data ({len} bytes)")]
    MalformedReturn { len: usize },

    /// The lookup could not reach the backing node.
    #[error("transport error: {reason}")]
    Transport { reason: String },
}

/// Outcome of one lookup: a 256-bit balance or a failure marker.
pub type RawBalance = Result<U256, LookupFailure>;

// ─── Target ───────────────────────────────────────────────────────────────────

/// One queried position in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "address", rename_all = "lowercase")]
pub enum Target {
    /// The chain's native asset. Always index 0.
    Native,
    /// A fungible token contract.
    Token(Address),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Token(addr) => write!(f, "{addr}"),
        }
    }
}

/// A target paired with its lookup outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    pub target: Target,
    pub result: RawBalance,
}

// ─── RawBatch ─────────────────────────────────────────────────────────────────

/// The executor's output: `1 + tokens` results in query order, native first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    pub account: Address,
    pub results: Vec<TargetResult>,
}

impl RawBatch {
    /// Total number of targets, native included.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of lookups that failed, native included.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_err()).count()
    }

    /// `(index, target, failure)` for every failed lookup.
    pub fn failures(&self) -> impl Iterator<Item = (usize, Target, &LookupFailure)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.result.as_ref().err().map(|e| (i, r.target, e)))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_aliases() {
        assert_eq!("legacy".parse::<CodecVariant>(), Ok(CodecVariant::SkipHeader));
        assert_eq!("Improved".parse::<CodecVariant>(), Ok(CodecVariant::RunLength));
        assert_eq!("run-length".parse::<CodecVariant>(), Ok(CodecVariant::RunLength));
        assert!("rle".parse::<CodecVariant>().is_err());
    }

    #[test]
    fn variant_serde_accepts_aliases() {
        let v: CodecVariant = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(v, CodecVariant::SkipHeader);
        assert_eq!(
            serde_json::to_string(&CodecVariant::RunLength).unwrap(),
            "\"run-length\""
        );
    }

    #[test]
    fn failure_value_differs_by_variant() {
        assert_eq!(CodecVariant::SkipHeader.failure_value(), Balance240::ZERO);
        assert_eq!(CodecVariant::RunLength.failure_value(), Balance240::ERROR);
    }

    #[test]
    fn lookup_failure_display() {
        let f = LookupFailure::Reverted {
            reason: Some("paused".into()),
            data: vec![],
        };
        assert_eq!(f.to_string(), "reverted: paused");
        let f = LookupFailure::Reverted { reason: None, data: vec![] };
        assert_eq!(f.to_string(), "reverted: no reason given");
        assert_eq!(LookupFailure::NoCode.to_string(), "target has no deployed code");
    }

    #[test]
    fn lookup_failure_serde_is_tagged() {
        let json = serde_json::to_string(&LookupFailure::MalformedReturn { len: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"malformed_return","len":3}"#);
    }

    #[test]
    fn raw_batch_failures_keep_indices() {
        let token = Address::repeat_byte(0xaa);
        let batch = RawBatch {
            account: Address::ZERO,
            results: vec![
                TargetResult { target: Target::Native, result: Ok(U256::from(1u8)) },
                TargetResult { target: Target::Token(token), result: Ok(U256::ZERO) },
                TargetResult { target: Target::Token(token), result: Err(LookupFailure::NoCode) },
            ],
        };
        let failures: Vec<_> = batch.failures().collect();
        assert_eq!(batch.failure_count(), 1);
        assert_eq!(failures[0].0, 2);
        assert_eq!(failures[0].1, Target::Token(token));
    }

    #[test]
    fn failure_count_includes_native() {
        let batch = RawBatch {
            account: Address::ZERO,
            results: vec![
                TargetResult { target: Target::Native, result: Err(LookupFailure::NoCode) },
                TargetResult {
                    target: Target::Token(Address::repeat_byte(0xaa)),
                    result: Err(LookupFailure::MalformedReturn { len: 0 }),
                },
            ],
        };
        assert_eq!(batch.failure_count(), 2);
        assert_eq!(batch.failures().next().map(|f| f.1), Some(Target::Native));
    }
}
