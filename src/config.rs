// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables the host can override when constructing a controller.
///
/// The history-cache numbers mirror what the desktop front end shipped with;
/// they are defaults, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Validity window of the history-context cache, in milliseconds.
    pub history_ttl_ms: u64,
    /// Most recent messages included in prompt context.
    pub history_max_messages: usize,
    /// Character budget for prompt context; truncation keeps the tail.
    pub history_max_chars: usize,
    /// Character budget for fetched URL excerpts.
    pub fetch_max_length: usize,
    /// Timeout handed to the gateway for URL fetches, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Model identifier forwarded to the gateway, if the host pins one.
    pub model: Option<String>,
    /// Opaque decoding knobs (temperature and friends) forwarded verbatim
    /// with every text generation.
    pub generation_config: Option<serde_json::Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_ttl_ms: 500,
            history_max_messages: 12,
            history_max_chars: 6000,
            fetch_max_length: 20_000,
            fetch_timeout_ms: 10_000,
            model: None,
            generation_config: None,
        }
    }
}

impl SessionConfig {
    pub(crate) fn history_ttl(&self) -> Duration {
        Duration::from_millis(self.history_ttl_ms)
    }

    pub(crate) fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.history_ttl_ms, 500);
        assert_eq!(config.history_max_messages, 12);
        assert_eq!(config.history_max_chars, 6000);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"history_ttl_ms": 100}"#).expect("valid config json");
        assert_eq!(config.history_ttl_ms, 100);
        assert_eq!(config.history_max_messages, 12);
    }
}
