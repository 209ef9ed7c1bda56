//! Runtime configuration for the sync layer.

use crate::error::SdkError;
#[cfg(feature = "http")]
use crate::http::retry::RetryConfig;
use crate::stream::StreamConfig;
use std::time::Duration;

pub const ENV_API_URL: &str = "SUBACCOUNT_SYNC_API_URL";
pub const ENV_STREAM_URL: &str = "SUBACCOUNT_SYNC_STREAM_URL";
pub const ENV_INTERVAL_MS: &str = "SUBACCOUNT_SYNC_INTERVAL_MS";

/// Default time between integrity rounds.
pub const DEFAULT_VALIDATION_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub api_url: String,
    pub stream_url: String,
    pub validation_interval: Duration,
    #[cfg(feature = "http")]
    pub retry: RetryConfig,
    /// Connection tuning; `url` is overridden by `stream_url`.
    pub stream: StreamConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: crate::network::DEFAULT_API_URL.to_string(),
            stream_url: crate::network::DEFAULT_STREAM_URL.to_string(),
            validation_interval: DEFAULT_VALIDATION_INTERVAL,
            #[cfg(feature = "http")]
            retry: RetryConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by the `SUBACCOUNT_SYNC_*` environment variables.
    pub fn from_env() -> Result<Self, SdkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SdkError> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup(ENV_STREAM_URL).filter(|v| !v.trim().is_empty()) {
            config.stream_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_INTERVAL_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                SdkError::Validation(format!("{} must be milliseconds, got {:?}", ENV_INTERVAL_MS, raw))
            })?;
            if ms == 0 {
                return Err(SdkError::Validation(format!("{} must be positive", ENV_INTERVAL_MS)));
            }
            config.validation_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn validation_interval(mut self, interval: Duration) -> Self {
        self.validation_interval = interval;
        self
    }

    /// Stream settings with the configured stream URL applied.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            url: self.stream_url.clone(),
            ..self.stream.clone()
        }
    }
}
