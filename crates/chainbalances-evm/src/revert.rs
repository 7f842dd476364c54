//! Turning failed `eth_call`s into [`LookupFailure`]s.
//!
//! Nodes report a reverted call as a JSON-RPC error (geth uses code `3`)
//! whose `data` member carries the raw revert bytes. Recognised payloads are
//! `Error(string)` from `require`/`revert` and `Panic(uint256)` from `assert`
//! and checked arithmetic.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use chainbalances_core::LookupFailure;
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::JsonRpcError;

/// The 4-byte selector for `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// The 4-byte selector for `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// JSON-RPC error code geth and most clients use for execution reverts.
const EXECUTION_ERROR_CODE: i64 = 3;

/// Decode revert data into a human-readable reason.
///
/// Returns `None` for empty data and unrecognised selectors (custom errors).
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, payload) = data.split_at(4);
    if selector == ERROR_STRING_SELECTOR {
        match DynSolType::String.abi_decode(payload) {
            Ok(DynSolValue::String(s)) => Some(s),
            _ => None,
        }
    } else if selector == PANIC_SELECTOR {
        match DynSolType::Uint(256).abi_decode(payload) {
            Ok(DynSolValue::Uint(v, _)) => {
                let code = v.saturating_to::<u64>();
                Some(format!("panic 0x{code:02x}: {}", panic_meaning(code)))
            }
            _ => None,
        }
    } else {
        None
    }
}

/// Map a Solidity panic code to a human-readable description.
pub fn panic_meaning(code: u64) -> &'static str {
    match code {
        0x00 => "generic compiler-inserted panic",
        0x01 => "assert() called with false condition",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "corrupted storage byte array",
        0x31 => ".pop() on empty array",
        0x32 => "out-of-bounds array access",
        0x41 => "too much memory allocated (out of memory)",
        0x51 => "called zero-initialized internal function pointer",
        _ => "unknown panic code",
    }
}

/// Whether a node error describes a reverted call rather than a broken request.
pub fn is_revert(err: &JsonRpcError) -> bool {
    err.code == EXECUTION_ERROR_CODE || err.message.to_ascii_lowercase().contains("revert")
}

/// Extract raw revert bytes from an error's `data` member.
///
/// Accepts `"0x…"` directly or an object with a nested `data` string.
pub fn revert_data(err: &JsonRpcError) -> Vec<u8> {
    fn from_value(value: &Value) -> Option<Vec<u8>> {
        match value {
            Value::String(s) => hex::decode(s.trim_start_matches("0x")).ok(),
            Value::Object(map) => map.get("data").and_then(from_value),
            _ => None,
        }
    }
    err.data.as_ref().and_then(from_value).unwrap_or_default()
}

/// Classify a transport-level failure of a token balance lookup.
pub fn lookup_failure(err: &TransportError) -> LookupFailure {
    match err {
        TransportError::Rpc(rpc) if is_revert(rpc) => {
            let data = revert_data(rpc);
            LookupFailure::Reverted {
                reason: decode_revert_reason(&data),
                data,
            }
        }
        other => LookupFailure::Transport {
            reason: other.to_string(),
        },
    }
}
