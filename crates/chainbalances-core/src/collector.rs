//! `BalanceCollector` — runs one native lookup and N token lookups, isolating
//! per-token failures, then normalizes and compresses the results.

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::codec::{codec_for, BalanceCodec, WireSequence};
use crate::config::CollectorConfig;
use crate::error::CollectError;
use crate::normalizer::normalize_batch;
use crate::source::BalanceSource;
use crate::types::{RawBatch, Target, TargetResult};
use crate::value::Balance240;

/// Output of [`BalanceCollector::collect`].
#[derive(Debug, Clone)]
pub struct CollectedBalances {
    /// Per-target lookup outcomes, native first.
    pub raw: RawBatch,
    /// Normalized balances, same order and length as `raw`.
    pub values: Vec<Balance240>,
    /// Compressed form of `values`.
    pub wire: WireSequence,
}

impl CollectedBalances {
    /// Expected decoded length: native plus one per token.
    pub fn total(&self) -> usize {
        self.values.len()
    }
}

/// Failure-isolated batch balance collector.
pub struct BalanceCollector<S> {
    source: S,
    config: CollectorConfig,
}

impl<S: BalanceSource> BalanceCollector<S> {
    pub fn new(source: S, config: CollectorConfig) -> Self {
        Self { source, config }
    }

    pub fn codec(&self) -> &'static dyn BalanceCodec {
        codec_for(self.config.codec)
    }

    /// Look up the native balance and every token balance, in input order.
    ///
    /// Token failures are recorded in place; only a native failure or an
    /// oversized batch returns `Err`. Duplicate tokens are queried once per
    /// occurrence.
    pub async fn query(&self, account: Address, tokens: &[Address]) -> Result<RawBatch, CollectError> {
        if tokens.len() > self.config.max_tokens {
            return Err(CollectError::TooManyTargets {
                count: tokens.len(),
                max: self.config.max_tokens,
            });
        }

        let native = self
            .source
            .native_balance(account)
            .await
            .map_err(CollectError::Native)?;

        let mut results = Vec::with_capacity(tokens.len() + 1);
        results.push(TargetResult {
            target: Target::Native,
            result: Ok(native),
        });

        for (i, token) in tokens.iter().enumerate() {
            let result = self.source.token_balance(account, *token).await;
            match &result {
                Ok(balance) => debug!(index = i + 1, %token, %balance, "token balance"),
                Err(e) => warn!(index = i + 1, %token, error = %e, "token lookup failed"),
            }
            results.push(TargetResult {
                target: Target::Token(*token),
                result,
            });
        }

        Ok(RawBatch { account, results })
    }

    /// Query, normalize and compress in one call.
    pub async fn collect(&self, account: Address, tokens: &[Address]) -> Result<CollectedBalances, CollectError> {
        let raw = self.query(account, tokens).await?;
        let values = normalize_batch(&raw, self.config.codec);
        let wire = self.codec().compress(&values);

        info!(
            source = self.source.name(),
            %account,
            tokens = tokens.len(),
            failures = raw.failure_count(),
            words = wire.len(),
            codec = %self.config.codec,
            "collected balances"
        );

        Ok(CollectedBalances { raw, values, wire })
    }
}
