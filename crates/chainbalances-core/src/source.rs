//! The `BalanceSource` trait, implemented by each chain backend, and an
//! in-memory source for tests and offline use.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use crate::types::{LookupFailure, RawBalance};

/// A backend that can read balances for an account.
///
/// Implementations must be `Send + Sync` so a collector can be shared across
/// Tokio tasks.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Human-readable identifier for logs (e.g. an RPC URL).
    fn name(&self) -> &str;

    /// Read the native-asset balance. A failure here aborts the batch.
    async fn native_balance(&self, account: Address) -> RawBalance;

    /// Read one token balance. Every failure must be returned as a
    /// [`LookupFailure`], never by panicking.
    async fn token_balance(&self, account: Address, token: Address) -> RawBalance;
}

// ─── In-memory source ─────────────────────────────────────────────────────────

/// A token contract held by [`MemoryBalanceSource`].
#[derive(Debug, Clone, Default)]
struct MemoryToken {
    balances: HashMap<Address, U256>,
    reverts: bool,
}

/// A `HashMap`-backed source. Unknown tokens behave like addresses without
/// code; tokens can be switched into a reverting state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBalanceSource {
    native: HashMap<Address, U256>,
    tokens: HashMap<Address, MemoryToken>,
}

impl MemoryBalanceSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the native balance of an account.
    pub fn set_native(&mut self, account: Address, amount: U256) {
        self.native.insert(account, amount);
    }

    /// Register a token so lookups against it succeed.
    pub fn deploy_token(&mut self, token: Address) {
        self.tokens.entry(token).or_default();
    }

    /// Credit `amount` to `account` on `token`, deploying it if needed.
    /// Saturates at `U256::MAX`.
    pub fn mint(&mut self, token: Address, account: Address, amount: U256) {
        let balance = self
            .tokens
            .entry(token)
            .or_default()
            .balances
            .entry(account)
            .or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Make every balance lookup against `token` revert (or stop reverting).
    pub fn set_reverts(&mut self, token: Address, reverts: bool) {
        self.tokens.entry(token).or_default().reverts = reverts;
    }
}

#[async_trait]
impl BalanceSource for MemoryBalanceSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn native_balance(&self, account: Address) -> RawBalance {
        Ok(self.native.get(&account).copied().unwrap_or_default())
    }

    async fn token_balance(&self, account: Address, token: Address) -> RawBalance {
        let contract = self.tokens.get(&token).ok_or(LookupFailure::NoCode)?;
        if contract.reverts {
            return Err(LookupFailure::Reverted {
                reason: None,
                data: Vec::new(),
            });
        }
        Ok(contract.balances.get(&account).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: Address = Address::repeat_byte(0x11);
    const TOKEN: Address = Address::repeat_byte(0x22);

    #[tokio::test]
    async fn unknown_token_has_no_code() {
        let source = MemoryBalanceSource::new();
        assert_eq!(
            source.token_balance(ACCOUNT, TOKEN).await,
            Err(LookupFailure::NoCode)
        );
    }

    #[tokio::test]
    async fn mint_accumulates() {
        let mut source = MemoryBalanceSource::new();
        source.mint(TOKEN, ACCOUNT, U256::from(5u8));
        source.mint(TOKEN, ACCOUNT, U256::from(6u8));
        assert_eq!(source.token_balance(ACCOUNT, TOKEN).await, Ok(U256::from(11u8)));
        assert_eq!(source.token_balance(Address::ZERO, TOKEN).await, Ok(U256::ZERO));
    }

    #[tokio::test]
    async fn reverting_token() {
        let mut source = MemoryBalanceSource::new();
        source.mint(TOKEN, ACCOUNT, U256::from(5u8));
        source.set_reverts(TOKEN, true);
        assert!(matches!(
            source.token_balance(ACCOUNT, TOKEN).await,
            Err(LookupFailure::Reverted { .. })
        ));
    }

    #[tokio::test]
    async fn native_defaults_to_zero() {
        let mut source = MemoryBalanceSource::new();
        assert_eq!(source.native_balance(ACCOUNT).await, Ok(U256::ZERO));
        source.set_native(ACCOUNT, U256::from(42u8));
        assert_eq!(source.native_balance(ACCOUNT).await, Ok(U256::from(42u8)));
    }
}
