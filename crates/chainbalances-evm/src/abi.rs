//! ABI helpers for the two calls this crate makes:
//! ERC-20 `balanceOf(address)` and the collector's
//! `getBalances(address,address[])`.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, U256};
use chainbalances_core::WireWord;

use crate::error::OnchainError;

/// `keccak256("balanceOf(address)")[..4]`
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Signature of the deployed collector's entry point.
pub const GET_BALANCES_SIGNATURE: &str = "getBalances(address,address[])";

/// Compute the 4-byte selector of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: Address) -> Vec<u8> {
    let mut calldata = BALANCE_OF_SELECTOR.to_vec();
    calldata.extend_from_slice(&DynSolValue::Address(owner).abi_encode());
    calldata
}

/// Calldata for `getBalances(account, tokens)`.
pub fn get_balances_calldata(account: Address, tokens: &[Address]) -> Vec<u8> {
    let args = DynSolValue::Tuple(vec![
        DynSolValue::Address(account),
        DynSolValue::Array(tokens.iter().copied().map(DynSolValue::Address).collect()),
    ]);
    let mut calldata = selector(GET_BALANCES_SIGNATURE).to_vec();
    calldata.extend_from_slice(&args.abi_encode_params());
    calldata
}

/// ABI-encode words as a `uint256[]` return value.
pub fn encode_word_array(words: &[WireWord]) -> Vec<u8> {
    DynSolValue::Array(
        words
            .iter()
            .map(|w| DynSolValue::Uint(w.as_u256(), 256))
            .collect(),
    )
    .abi_encode()
}

/// ABI-decode a `uint256[]` return value.
pub fn decode_word_array(data: &[u8]) -> Result<Vec<WireWord>, OnchainError> {
    let ty = DynSolType::Array(Box::new(DynSolType::Uint(256)));
    let decoded = ty
        .abi_decode(data)
        .map_err(|e| OnchainError::AbiDecodeFailed {
            reason: format!("uint256[] return: {e}"),
        })?;

    let items = match decoded {
        DynSolValue::Array(items) => items,
        other => {
            return Err(OnchainError::AbiDecodeFailed {
                reason: format!("expected array, got {other:?}"),
            })
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            DynSolValue::Uint(v, _) => Ok(WireWord::from_u256(v)),
            other => Err(OnchainError::AbiDecodeFailed {
                reason: format!("expected uint256 element, got {other:?}"),
            }),
        })
        .collect()
}

/// Interpret `balanceOf` return data; `None` if it is not a full word.
///
/// Only the first 32 bytes are read, matching Solidity's decoding of a
/// `uint256` return from a contract that returns extra data.
pub fn decode_balance(data: &[u8]) -> Option<U256> {
    data.get(..32).map(U256::from_be_slice)
}
