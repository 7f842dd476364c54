//! Legacy skip-header codec.
//!
//! Layout of the wire sequence:
//! - word 0: the native balance, header `0x0000`
//! - each following word carries one non-zero token balance; when zeros
//!   preceded it, the header is `0x8000 | zeros` (flag + 15-bit count)
//! - trailing zeros are not emitted
//!
//! A zero run longer than [`MAX_SKIP`] is split by emitting a flagged word
//! with a zero payload, which covers `MAX_SKIP + 1` zeros.

use tracing::trace;

use super::{check_input, output_buffer, BalanceCodec, WireSequence};
use crate::error::CodecError;
use crate::types::CodecVariant;
use crate::value::{Balance240, WireWord};

/// Header bit marking "zeros were skipped before this balance".
pub const SKIP_FLAG: u16 = 0x8000;

/// Largest zero count a single header can carry.
pub const MAX_SKIP: usize = 0x7FFF;

/// Legacy codec. Pairs with failures normalized to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipHeaderCodec;

impl BalanceCodec for SkipHeaderCodec {
    fn variant(&self) -> CodecVariant {
        CodecVariant::SkipHeader
    }

    fn compress(&self, values: &[Balance240]) -> WireSequence {
        let Some((native, tokens)) = values.split_first() else {
            return WireSequence::new(self.variant(), Vec::new());
        };

        let mut words = vec![WireWord::new(0, *native)];
        let mut zeros = 0usize;

        for value in tokens {
            if value.is_zero() {
                zeros += 1;
                continue;
            }
            while zeros > MAX_SKIP {
                words.push(WireWord::new(SKIP_FLAG | MAX_SKIP as u16, Balance240::ZERO));
                zeros -= MAX_SKIP + 1;
            }
            let header = if zeros == 0 {
                0
            } else {
                SKIP_FLAG | zeros as u16
            };
            words.push(WireWord::new(header, *value));
            zeros = 0;
        }

        trace!(
            balances = values.len(),
            words = words.len(),
            trailing_zeros = zeros,
            "skip-header compress"
        );
        WireSequence::new(self.variant(), words)
    }

    fn decompress(&self, wire: &WireSequence, total: usize) -> Result<Vec<Balance240>, CodecError> {
        check_input(self.variant(), wire, total)?;

        let (native, rest) = wire
            .words()
            .split_first()
            .ok_or(CodecError::MissingNativeEntry)?;
        if native.header() != 0 {
            return Err(CodecError::InvalidHeader {
                index: 0,
                header: native.header(),
            });
        }

        let mut out = output_buffer(total)?;
        out.push(native.payload());

        for (offset, word) in rest.iter().enumerate() {
            let index = offset + 1;
            let header = word.header();
            let skipped = if header & SKIP_FLAG != 0 {
                (header & !SKIP_FLAG) as usize
            } else if header == 0 {
                0
            } else {
                return Err(CodecError::InvalidHeader { index, header });
            };

            let implied = out.len() + skipped + 1;
            if implied > total {
                return Err(CodecError::LengthOverflow {
                    index,
                    total,
                    implied,
                });
            }
            out.resize(out.len() + skipped, Balance240::ZERO);
            out.push(word.payload());
        }

        out.resize(total, Balance240::ZERO);
        Ok(out)
    }
}
