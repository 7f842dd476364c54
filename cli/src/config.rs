//! `chainbalances.json` — file-based settings merged with command-line flags.

use std::path::Path;

use chainbalances_core::{CollectorConfig, ConfigError};
use chainbalances_evm::RpcConfig;
use serde::{Deserialize, Serialize};

use crate::tracing_setup::LogConfig;

/// Top-level CLI configuration.
///
/// ```json
/// {
///   "rpc": { "rpc_url": "https://cloudflare-eth.com", "block": "finalized" },
///   "collector": { "codec": "legacy" },
///   "log": { "level": "info", "json": true }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc: Option<RpcConfig>,
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rpc) = &self.rpc {
            if rpc.rpc_url.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "rpc.rpc_url must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// The RPC config to use, with `url` (from `--url`) overriding the file.
    pub fn rpc_with_url(&self, url: Option<String>) -> Result<RpcConfig, ConfigError> {
        match (url, &self.rpc) {
            (Some(url), Some(rpc)) => Ok(RpcConfig {
                rpc_url: url,
                ..rpc.clone()
            }),
            (Some(url), None) => Ok(RpcConfig::new(url)),
            (None, Some(rpc)) => Ok(rpc.clone()),
            (None, None) => Err(ConfigError::Invalid {
                reason: "no RPC endpoint: pass --url or set rpc.rpc_url".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbalances_core::CodecVariant;
    use chainbalances_evm::BlockTag;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert!(config.rpc.is_none());
        assert_eq!(config.collector.codec, CodecVariant::RunLength);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn full_config() {
        let config = AppConfig::from_json_str(
            r#"{
                "rpc": { "rpc_url": "http://localhost:8545", "block": "finalized", "max_retries": 1 },
                "collector": { "codec": "legacy", "max_tokens": 100 },
                "log": { "level": "debug", "json": true }
            }"#,
        )
        .unwrap();
        let rpc = config.rpc.as_ref().unwrap();
        assert_eq!(rpc.block, BlockTag::Finalized);
        assert_eq!(rpc.max_retries, 1);
        assert_eq!(config.collector.codec, CodecVariant::SkipHeader);
        assert_eq!(config.collector.max_tokens, 100);
        assert!(config.log.json);
    }

    #[test]
    fn url_flag_overrides_file() {
        let config = AppConfig::from_json_str(
            r#"{ "rpc": { "rpc_url": "http://file", "block": "safe" } }"#,
        )
        .unwrap();
        let rpc = config.rpc_with_url(Some("http://flag".into())).unwrap();
        assert_eq!(rpc.rpc_url, "http://flag");
        assert_eq!(rpc.block, BlockTag::Safe);

        assert!(AppConfig::default().rpc_with_url(None).is_err());
    }

    #[test]
    fn rejects_empty_url_and_bad_json() {
        assert!(matches!(
            AppConfig::from_json_str(r#"{ "rpc": { "rpc_url": " " } }"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(AppConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::from_json_file("/nonexistent/chainbalances.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
