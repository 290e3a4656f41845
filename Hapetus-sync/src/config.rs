use std::time::Duration;

use crate::error::SyncError;
use crate::retry::RetryPolicy;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where and how the client talks to the API
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Server origin, e.g. `https://api.example.com`
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl SyncConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    /// Read `HAPETUS_API_URL`, `SYNC_TIMEOUT_SECONDS`, `SYNC_MAX_ATTEMPTS`
    /// and `SYNC_INITIAL_BACKOFF_MS`
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("HAPETUS_API_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| SyncError::Config("HAPETUS_API_URL is not set".to_string()))?;
        let mut config = Self::new(base_url);

        if let Some(secs) = parse(&lookup, "SYNC_TIMEOUT_SECONDS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse(&lookup, "SYNC_MAX_ATTEMPTS")? {
            config.retry.max_attempts = u32::try_from(attempts.max(1))
                .map_err(|_| SyncError::Config(format!("SYNC_MAX_ATTEMPTS is too large: {}", attempts)))?;
        }
        if let Some(ms) = parse(&lookup, "SYNC_INITIAL_BACKOFF_MS")? {
            config.retry.initial_backoff = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse<F>(lookup: &F, name: &str) -> Result<Option<u64>, SyncError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| SyncError::Config(format!("{} must be a positive integer, got {}", name, value)))
        })
        .transpose()
}
