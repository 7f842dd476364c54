//! Client for a deployed collector contract.
//!
//! The contract runs the whole pipeline inside one `eth_call` and returns
//! the compressed words as `uint256[]`. Which wire format it speaks is a
//! property of the deployment, so the caller supplies the variant.

use alloy_primitives::Address;
use chainbalances_core::{Balance240, CodecVariant, WireSequence};
use tracing::{debug, info};

use crate::abi;
use crate::config::BlockTag;
use crate::error::OnchainError;
use crate::source::hex_bytes;
use crate::transport::RpcTransport;

/// Calls `getBalances(address,address[])` on a collector contract.
pub struct OnchainCollector<T> {
    transport: T,
    address: Address,
    variant: CodecVariant,
    block: BlockTag,
}

impl<T: RpcTransport> OnchainCollector<T> {
    pub fn new(transport: T, address: Address, variant: CodecVariant) -> Self {
        Self {
            transport,
            address,
            variant,
            block: BlockTag::Latest,
        }
    }

    /// Read at a specific block instead of `latest`.
    pub fn at_block(mut self, block: BlockTag) -> Self {
        self.block = block;
        self
    }

    /// Fetch the compressed words without decoding them.
    pub async fn fetch_wire(&self, account: Address, tokens: &[Address]) -> Result<WireSequence, OnchainError> {
        let call = serde_json::json!({
            "to": self.address.to_string(),
            "data": format!("0x{}", hex::encode(abi::get_balances_calldata(account, tokens))),
        });
        let result = self
            .transport
            .request("eth_call", vec![call, self.block.as_param()])
            .await?;
        let data = hex_bytes(&result)?;
        let words = abi::decode_word_array(&data)?;

        debug!(
            collector = %self.address,
            %account,
            tokens = tokens.len(),
            words = words.len(),
            "fetched compressed balances"
        );
        Ok(WireSequence::new(self.variant, words))
    }

    /// Fetch and decode to one value per target, native first.
    pub async fn fetch(&self, account: Address, tokens: &[Address]) -> Result<Vec<Balance240>, OnchainError> {
        let wire = self.fetch_wire(account, tokens).await?;
        let values = wire.decode(tokens.len() + 1)?;

        info!(
            collector = %self.address,
            %account,
            tokens = tokens.len(),
            words = wire.len(),
            failures = values.iter().filter(|v| v.is_error()).count(),
            codec = %self.variant,
            "decoded on-chain balances"
        );
        Ok(values)
    }
}
