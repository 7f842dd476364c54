//! The `BalanceCodec` trait and the variant-tagged wire sequence.
//!
//! Two implementations exist:
//! - [`SkipHeaderCodec`] — legacy format, zero runs folded into a flagged
//!   header in front of the next non-zero balance.
//! - [`RunLengthCodec`] — improved format, every maximal run of equal
//!   balances collapsed into one word carrying its repeat count.
//!
//! Both elide trailing zeros; the decoder restores them from the expected
//! total length, which is never transmitted.

mod run_length;
mod skip_header;

pub use run_length::{RunLengthCodec, MAX_RUN};
pub use skip_header::{SkipHeaderCodec, MAX_SKIP, SKIP_FLAG};

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::types::CodecVariant;
use crate::value::{Balance240, WireWord};

/// Compressed words tagged with the codec that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSequence {
    variant: CodecVariant,
    words: Vec<WireWord>,
}

impl WireSequence {
    /// Tag raw words (e.g. returned by an on-chain collector) with their format.
    pub fn new(variant: CodecVariant, words: Vec<WireWord>) -> Self {
        Self { variant, words }
    }

    pub fn variant(&self) -> CodecVariant {
        self.variant
    }

    pub fn words(&self) -> &[WireWord] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Decode with the codec matching this sequence's tag.
    pub fn decode(&self, total: usize) -> Result<Vec<Balance240>, CodecError> {
        codec_for(self.variant).decompress(self, total)
    }
}

/// A compact encoding of a normalized balance sequence.
///
/// `values[0]` is always the native balance. Implementations must be exact
/// inverses: `decompress(compress(v), v.len()) == v`.
pub trait BalanceCodec: Send + Sync {
    /// The wire format this codec reads and writes.
    fn variant(&self) -> CodecVariant;

    /// Compress a dense balance sequence.
    fn compress(&self, values: &[Balance240]) -> WireSequence;

    /// Reconstruct the dense sequence of length `total`.
    ///
    /// Fails on sequences tagged with another variant and on malformed
    /// entries; never truncates.
    fn decompress(&self, wire: &WireSequence, total: usize) -> Result<Vec<Balance240>, CodecError>;
}

/// Return the codec implementation for a variant.
pub fn codec_for(variant: CodecVariant) -> &'static dyn BalanceCodec {
    match variant {
        CodecVariant::SkipHeader => &SkipHeaderCodec,
        CodecVariant::RunLength => &RunLengthCodec,
    }
}

/// Shared decoder preamble: tag check and total-length sanity.
fn check_input(
    expected: CodecVariant,
    wire: &WireSequence,
    total: usize,
) -> Result<(), CodecError> {
    if wire.variant != expected {
        return Err(CodecError::VariantMismatch {
            expected,
            got: wire.variant,
        });
    }
    if total == 0 {
        return Err(CodecError::TotalLengthZero);
    }
    Ok(())
}

/// Allocate the decoder's output up front; `total` comes from the caller.
fn output_buffer(total: usize) -> Result<Vec<Balance240>, CodecError> {
    let mut out = Vec::new();
    out.try_reserve_exact(total)
        .map_err(|_| CodecError::TotalTooLarge { total })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn b(v: u64) -> Balance240 {
        Balance240::clamped(U256::from(v))
    }

    /// Deterministic mixed sequences covering zeros, repeats, sentinels.
    fn samples() -> Vec<Vec<Balance240>> {
        let e = Balance240::ERROR;
        let m = Balance240::MAX;
        vec![
            vec![b(0)],
            vec![b(5)],
            vec![b(0), b(0), b(0)],
            vec![b(9), b(0), b(0), b(0)],
            vec![b(0), b(0), b(7)],
            vec![b(1), b(1), b(1), b(1)],
            vec![b(3), e, e, e, b(0), m, m, b(0), b(0)],
            vec![b(0), b(12_345_678), b(0), b(0), b(0), b(0), m, b(0), b(0), b(0), b(0), b(0), b(0), e, m, m, m],
            vec![m, m, m],
        ]
    }

    #[test]
    fn roundtrip_both_variants() {
        for variant in [CodecVariant::SkipHeader, CodecVariant::RunLength] {
            let codec = codec_for(variant);
            for values in samples() {
                let wire = codec.compress(&values);
                assert_eq!(wire.variant(), variant);
                let back = wire.decode(values.len()).unwrap();
                assert_eq!(back, values, "{variant} roundtrip failed for {values:?}");
            }
        }
    }

    #[test]
    fn variant_mismatch_is_rejected() {
        let wire = SkipHeaderCodec.compress(&[b(1), b(2)]);
        let err = RunLengthCodec.decompress(&wire, 2).unwrap_err();
        assert_eq!(
            err,
            CodecError::VariantMismatch {
                expected: CodecVariant::RunLength,
                got: CodecVariant::SkipHeader,
            }
        );
    }

    #[test]
    fn zero_total_is_rejected() {
        for variant in [CodecVariant::SkipHeader, CodecVariant::RunLength] {
            let wire = WireSequence::new(variant, vec![]);
            assert_eq!(wire.decode(0), Err(CodecError::TotalLengthZero));
        }
    }

    #[test]
    fn unallocatable_total_is_an_error() {
        for variant in [CodecVariant::SkipHeader, CodecVariant::RunLength] {
            let wire = codec_for(variant).compress(&[b(5)]);
            assert_eq!(
                wire.decode(usize::MAX),
                Err(CodecError::TotalTooLarge { total: usize::MAX })
            );
        }
    }

    #[test]
    fn codec_for_matches_variant() {
        assert_eq!(codec_for(CodecVariant::SkipHeader).variant(), CodecVariant::SkipHeader);
        assert_eq!(codec_for(CodecVariant::RunLength).variant(), CodecVariant::RunLength);
    }
}
