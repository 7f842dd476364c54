//! The 240-bit balance domain and the 256-bit wire word.
//!
//! A wire word is laid out as:
//!
//! ```text
//!  255        240 239                                   0
//! ┌────────────┬──────────────────────────────────────────┐
//! │ header u16 │ payload (Balance240)                     │
//! └────────────┴──────────────────────────────────────────┘
//! ```
//!
//! The all-ones payload `2^240 - 1` is reserved as the error sentinel, so a
//! genuine balance never encodes to it.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of payload bits in a wire word.
pub const PAYLOAD_BITS: usize = 240;

/// Mask selecting the payload bits of a wire word.
pub const PAYLOAD_MASK: U256 =
    U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, 0x0000_FFFF_FFFF_FFFF]);

// ─── Balance240 ───────────────────────────────────────────────────────────────

/// A balance normalized into the 240-bit payload domain.
///
/// Construct with [`Balance240::clamped`] from a genuine balance; the only way
/// to obtain [`Balance240::ERROR`] is the constant itself or decoding a wire
/// payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Balance240(U256);

impl Balance240 {
    /// Zero balance.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Largest representable non-error balance, `2^240 - 2`.
    pub const MAX: Self =
        Self(U256::from_limbs([u64::MAX - 1, u64::MAX, u64::MAX, 0x0000_FFFF_FFFF_FFFF]));

    /// Reserved error sentinel, `2^240 - 1`.
    pub const ERROR: Self = Self(PAYLOAD_MASK);

    /// Normalize a genuine balance: values above [`Balance240::MAX`] clamp to it.
    pub fn clamped(value: U256) -> Self {
        if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Extract the payload bits of a 256-bit word. May yield [`Balance240::ERROR`].
    pub fn from_payload(word: U256) -> Self {
        Self(word & PAYLOAD_MASK)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` for the reserved error sentinel.
    pub fn is_error(&self) -> bool {
        *self == Self::ERROR
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<Balance240> for U256 {
    fn from(value: Balance240) -> Self {
        value.0
    }
}

impl TryFrom<U256> for Balance240 {
    type Error = U256;

    /// Accepts any value that fits in 240 bits, the sentinel included.
    fn try_from(value: U256) -> Result<Self, Self::Error> {
        if value > PAYLOAD_MASK {
            Err(value)
        } else {
            Ok(Self(value))
        }
    }
}

impl<'de> Deserialize<'de> for Balance240 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = U256::deserialize(deserializer)?;
        Self::try_from(raw).map_err(|v| {
            serde::de::Error::custom(format!("value {v} does not fit in {PAYLOAD_BITS} bits"))
        })
    }
}

impl fmt::Display for Balance240 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            write!(f, "ERROR")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ─── WireWord ─────────────────────────────────────────────────────────────────

/// One compressed entry: a 16-bit header above a 240-bit payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireWord(U256);

impl WireWord {
    /// Pack a header and payload into a word.
    pub fn new(header: u16, payload: Balance240) -> Self {
        Self((U256::from(header) << PAYLOAD_BITS) | payload.0)
    }

    /// Wrap a raw 256-bit word as received on the wire.
    pub const fn from_u256(word: U256) -> Self {
        Self(word)
    }

    /// The top 16 bits.
    pub fn header(&self) -> u16 {
        (self.0.as_limbs()[3] >> 48) as u16
    }

    /// The low 240 bits.
    pub fn payload(&self) -> Balance240 {
        Balance240::from_payload(self.0)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Big-endian 32-byte encoding, as the word appears in ABI data.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }
}

impl From<U256> for WireWord {
    fn from(word: U256) -> Self {
        Self(word)
    }
}

impl From<WireWord> for U256 {
    fn from(word: WireWord) -> Self {
        word.0
    }
}

impl fmt::Display for WireWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_be_bytes()))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn pow2(bits: usize) -> U256 {
        U256::from(1u8) << bits
    }

    #[test]
    fn sentinel_constants() {
        assert_eq!(Balance240::ERROR.as_u256(), pow2(240) - U256::from(1u8));
        assert_eq!(Balance240::MAX.as_u256(), pow2(240) - U256::from(2u8));
        assert_eq!(PAYLOAD_MASK, pow2(240) - U256::from(1u8));
    }

    #[test]
    fn clamp_boundaries() {
        let max = Balance240::MAX.as_u256();
        assert_eq!(Balance240::clamped(max - U256::from(1u8)).as_u256(), max - U256::from(1u8));
        assert_eq!(Balance240::clamped(max), Balance240::MAX);
        assert_eq!(Balance240::clamped(max + U256::from(1u8)), Balance240::MAX);
        assert_eq!(Balance240::clamped(U256::MAX), Balance240::MAX);
        assert!(!Balance240::clamped(U256::MAX).is_error());
    }

    #[test]
    fn try_from_rejects_wide_values() {
        assert_eq!(Balance240::try_from(PAYLOAD_MASK), Ok(Balance240::ERROR));
        assert!(Balance240::try_from(pow2(240)).is_err());
    }

    #[test]
    fn word_header_and_payload() {
        let word = WireWord::new(0x8001, Balance240::clamped(U256::from(12_345_678u64)));
        assert_eq!(word.header(), 0x8001);
        assert_eq!(word.payload().as_u256(), U256::from(12_345_678u64));
        assert_eq!(
            word.as_u256(),
            U256::from(12_345_678u64) | (U256::from(0x8001u64) << 240)
        );
    }

    #[test]
    fn word_display_is_padded_hex() {
        let word = WireWord::new(0x0002, Balance240::MAX);
        assert_eq!(
            word.to_string(),
            "0x0002fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe"
        );
    }

    #[test]
    fn balance_display_marks_sentinel() {
        assert_eq!(Balance240::ERROR.to_string(), "ERROR");
        assert_eq!(Balance240::clamped(U256::from(42u8)).to_string(), "42");
    }
}
