//! A [`BalanceSource`] that reads balances from an EVM node over JSON-RPC.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use chainbalances_core::{BalanceSource, LookupFailure, RawBalance};
use serde_json::Value;

use crate::abi;
use crate::config::BlockTag;
use crate::error::TransportError;
use crate::revert;
use crate::transport::RpcTransport;

/// Reads native balances with `eth_getBalance` and token balances with an
/// `eth_call` to `balanceOf(address)`.
pub struct RpcBalanceSource<T> {
    transport: T,
    block: BlockTag,
}

impl<T: RpcTransport> RpcBalanceSource<T> {
    pub fn new(transport: T, block: BlockTag) -> Self {
        Self { transport, block }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn block(&self) -> BlockTag {
        self.block
    }

    async fn code_is_empty(&self, token: Address) -> Result<bool, TransportError> {
        let code = self
            .transport
            .request(
                "eth_getCode",
                vec![Value::String(token.to_string()), self.block.as_param()],
            )
            .await?;
        Ok(hex_bytes(&code)?.is_empty())
    }
}

#[async_trait]
impl<T: RpcTransport> BalanceSource for RpcBalanceSource<T> {
    fn name(&self) -> &str {
        self.transport.url()
    }

    async fn native_balance(&self, account: Address) -> RawBalance {
        let result = self
            .transport
            .request(
                "eth_getBalance",
                vec![Value::String(account.to_string()), self.block.as_param()],
            )
            .await
            .and_then(|v| hex_quantity(&v));
        result.map_err(|e| LookupFailure::Transport {
            reason: e.to_string(),
        })
    }

    async fn token_balance(&self, account: Address, token: Address) -> RawBalance {
        match self.code_is_empty(token).await {
            Ok(true) => return Err(LookupFailure::NoCode),
            Ok(false) => {}
            Err(e) => return Err(revert::lookup_failure(&e)),
        }

        let call = serde_json::json!({
            "to": token.to_string(),
            "data": format!("0x{}", hex::encode(abi::balance_of_calldata(account))),
        });
        let data = self
            .transport
            .request("eth_call", vec![call, self.block.as_param()])
            .await
            .and_then(|v| hex_bytes(&v))
            .map_err(|e| revert::lookup_failure(&e))?;

        abi::decode_balance(&data).ok_or(LookupFailure::MalformedReturn { len: data.len() })
    }
}

/// Decode a `0x`-prefixed hex data string.
pub(crate) fn hex_bytes(value: &Value) -> Result<Vec<u8>, TransportError> {
    let s = value
        .as_str()
        .ok_or_else(|| TransportError::UnexpectedResponse(format!("expected hex string, got {value}")))?;
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| TransportError::UnexpectedResponse(format!("invalid hex data '{s}': {e}")))
}

/// Decode a `0x`-prefixed hex quantity (no leading zeros required).
fn hex_quantity(value: &Value) -> Result<U256, TransportError> {
    let s = value
        .as_str()
        .ok_or_else(|| TransportError::UnexpectedResponse(format!("expected quantity, got {value}")))?;
    let digits = s.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| TransportError::UnexpectedResponse(format!("invalid quantity '{s}': {e}")))
}
