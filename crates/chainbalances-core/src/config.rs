//! Collector configuration.

use serde::{Deserialize, Serialize};

use crate::types::CodecVariant;

/// Configuration for a [`crate::BalanceCollector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Wire format (and failure mapping) to produce.
    #[serde(default)]
    pub codec: CodecVariant,
    /// Reject batches with more token addresses than this.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

fn default_max_tokens() -> usize { 65_535 }

impl CollectorConfig {
    pub fn new(codec: CodecVariant) -> Self {
        Self {
            codec,
            max_tokens: default_max_tokens(),
        }
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n;
        self
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new(CodecVariant::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_json() {
        let cfg: CollectorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, CollectorConfig::default());
        assert_eq!(cfg.codec, CodecVariant::RunLength);
        assert_eq!(cfg.max_tokens, 65_535);
    }

    #[test]
    fn legacy_alias_in_json() {
        let cfg: CollectorConfig =
            serde_json::from_str(r#"{ "codec": "legacy", "max_tokens": 16 }"#).unwrap();
        assert_eq!(cfg.codec, CodecVariant::SkipHeader);
        assert_eq!(cfg.max_tokens, 16);
    }
}
