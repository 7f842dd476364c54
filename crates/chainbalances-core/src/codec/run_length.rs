//! Improved run-length codec.
//!
//! Every maximal run of equal balances becomes one word whose payload is the
//! balance and whose header is `run length - 1`. The native balance is always
//! its own run. A final run of zeros is not emitted; if that leaves only a
//! zero native balance, it is dropped too, so an all-zero account encodes to
//! an empty sequence.
//!
//! Runs longer than [`MAX_RUN`] are split into consecutive words.

use tracing::trace;

use super::{check_input, output_buffer, BalanceCodec, WireSequence};
use crate::error::CodecError;
use crate::types::CodecVariant;
use crate::value::{Balance240, WireWord};

/// Most balances one word can cover (header `0xFFFF`).
pub const MAX_RUN: usize = 1 << 16;

/// Improved codec. Pairs with failures normalized to [`Balance240::ERROR`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLengthCodec;

impl RunLengthCodec {
    fn push_run(words: &mut Vec<WireWord>, value: Balance240, mut len: usize) {
        while len > 0 {
            let n = len.min(MAX_RUN);
            words.push(WireWord::new((n - 1) as u16, value));
            len -= n;
        }
    }
}

impl BalanceCodec for RunLengthCodec {
    fn variant(&self) -> CodecVariant {
        CodecVariant::RunLength
    }

    fn compress(&self, values: &[Balance240]) -> WireSequence {
        let Some((native, tokens)) = values.split_first() else {
            return WireSequence::new(self.variant(), Vec::new());
        };

        let mut words = vec![WireWord::new(0, *native)];
        let mut start = 0usize;

        while start < tokens.len() {
            let value = tokens[start];
            let end = tokens[start..]
                .iter()
                .position(|v| *v != value)
                .map_or(tokens.len(), |n| start + n);

            if end == tokens.len() && value.is_zero() {
                break;
            }
            Self::push_run(&mut words, value, end - start);
            start = end;
        }

        if words.len() == 1 && native.is_zero() {
            words.clear();
        }

        trace!(
            balances = values.len(),
            words = words.len(),
            "run-length compress"
        );
        WireSequence::new(self.variant(), words)
    }

    fn decompress(&self, wire: &WireSequence, total: usize) -> Result<Vec<Balance240>, CodecError> {
        check_input(self.variant(), wire, total)?;

        let mut out = output_buffer(total)?;
        for (index, word) in wire.words().iter().enumerate() {
            let count = word.header() as usize + 1;
            let implied = out.len() + count;
            if implied > total {
                return Err(CodecError::LengthOverflow {
                    index,
                    total,
                    implied,
                });
            }
            out.resize(implied, word.payload());
        }

        out.resize(total, Balance240::ZERO);
        Ok(out)
    }
}
