//! RPC connection configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::retry::RetryConfig;

/// Block at which balances are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockTag {
    #[default]
    Latest,
    Pending,
    Safe,
    Finalized,
    Number(u64),
}

impl BlockTag {
    /// The JSON-RPC parameter form (`"latest"`, `"0x10d4f"`, …).
    pub fn as_param(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Pending => write!(f, "pending"),
            Self::Safe => write!(f, "safe"),
            Self::Finalized => write!(f, "finalized"),
            Self::Number(n) => write!(f, "0x{n:x}"),
        }
    }
}

impl FromStr for BlockTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(Self::Latest),
            "pending" => Ok(Self::Pending),
            "safe" => Ok(Self::Safe),
            "finalized" => Ok(Self::Finalized),
            other => {
                let parsed = match other.strip_prefix("0x") {
                    Some(hex) => u64::from_str_radix(hex, 16),
                    None => other.parse::<u64>(),
                };
                parsed
                    .map(Self::Number)
                    .map_err(|_| format!("invalid block tag '{other}'"))
            }
        }
    }
}

impl TryFrom<String> for BlockTag {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BlockTag> for String {
    fn from(tag: BlockTag) -> Self {
        tag.to_string()
    }
}

/// Configuration for a chain's JSON-RPC connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// HTTP RPC endpoint, e.g. "https://mainnet.infura.io/v3/..."
    pub rpc_url: String,
    /// Maximum retry attempts on transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Block to read balances at
    #[serde(default)]
    pub block: BlockTag,
}

fn default_max_retries() -> u32 { 3 }
fn default_backoff_ms() -> u64 { 100 }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl RpcConfig {
    /// Config for an endpoint with default retry and timeout settings.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            block: BlockTag::Latest,
        }
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.backoff_ms),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
