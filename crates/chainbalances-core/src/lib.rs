//! chainbalances-core — foundation types, codecs and the batch collector for
//! the ChainBalances library.
//!
//! This crate defines:
//! - [`Balance240`] — a balance clamped into the 240-bit payload domain
//! - [`WireWord`] / [`WireSequence`] — the compact 256-bit wire format
//! - [`BalanceCodec`] — the codec trait, with [`SkipHeaderCodec`] (legacy)
//!   and [`RunLengthCodec`] (improved) implementations
//! - [`BalanceSource`] — the trait every chain backend implements
//! - [`BalanceCollector`] — the failure-isolated batch executor
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use alloy_primitives::{Address, U256};
//! use chainbalances_core::{BalanceCollector, CodecVariant, CollectorConfig, MemoryBalanceSource};
//!
//! # async fn run() -> Result<(), chainbalances_core::CollectError> {
//! let account = Address::repeat_byte(0x11);
//! let token = Address::repeat_byte(0x22);
//!
//! let mut source = MemoryBalanceSource::new();
//! source.deploy_token(token);
//! source.mint(token, account, U256::from(12_345_678u64));
//!
//! let collector = BalanceCollector::new(source, CollectorConfig::new(CodecVariant::RunLength));
//! let collected = collector.collect(account, &[token]).await?;
//! println!("{} words for {} balances", collected.wire.len(), collected.total());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod collector;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod source;
pub mod types;
pub mod value;

pub use codec::{codec_for, BalanceCodec, RunLengthCodec, SkipHeaderCodec, WireSequence};
pub use collector::{BalanceCollector, CollectedBalances};
pub use config::CollectorConfig;
pub use error::{CodecError, CollectError, ConfigError};
pub use normalizer::{normalize, normalize_batch};
pub use source::{BalanceSource, MemoryBalanceSource};
pub use types::{CodecVariant, LookupFailure, RawBalance, RawBatch, Target, TargetResult};
pub use value::{Balance240, WireWord};
