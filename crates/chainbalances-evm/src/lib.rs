//! chainbalances-evm — EVM backends for ChainBalances.
//!
//! - [`RpcBalanceSource`] — a [`chainbalances_core::BalanceSource`] that reads
//!   balances over JSON-RPC (`eth_getBalance`, `eth_getCode`, `eth_call`)
//! - [`OnchainCollector`] — calls a deployed collector contract's
//!   `getBalances(address,address[])` and decodes its compressed reply
//! - [`HttpRpcClient`] — `reqwest`-backed transport with retry
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chainbalances_core::{BalanceCollector, CollectorConfig};
//! use chainbalances_evm::{HttpRpcClient, RpcBalanceSource, RpcConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RpcConfig::new("https://cloudflare-eth.com");
//! let client = HttpRpcClient::from_config(&config)?;
//! let source = RpcBalanceSource::new(client, config.block);
//! let collector = BalanceCollector::new(source, CollectorConfig::default());
//!
//! let account = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse()?;
//! let usdc = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".parse()?;
//! let collected = collector.collect(account, &[usdc]).await?;
//! for word in collected.wire.words() {
//!     println!("{word}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod config;
pub mod error;
pub mod http;
pub mod onchain;
pub mod retry;
pub mod revert;
pub mod source;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{BlockTag, RpcConfig};
pub use error::{OnchainError, TransportError};
pub use http::{HttpClientConfig, HttpRpcClient};
pub use onchain::OnchainCollector;
pub use retry::{RetryConfig, RetryPolicy};
pub use source::RpcBalanceSource;
pub use transport::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcTransport};
