//! Configuration structures for HTTP transfers

use std::time::Duration;

/// Per-transfer streaming settings
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Timeout for individual body chunks (default: 60s)
    pub chunk_timeout: Duration,
    /// Minimum spacing between progress updates (default: 500ms)
    pub progress_interval: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_timeout: Duration::from_secs(60),
            progress_interval: Duration::from_millis(500),
        }
    }
}

impl TransferConfig {
    #[must_use]
    pub fn from_config(network: &bgdl_config::NetworkConfig) -> Self {
        Self {
            chunk_timeout: network.chunk_timeout(),
            progress_interval: network.progress_interval(),
        }
    }
}

/// Retry configuration for requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial backoff delay
    pub initial_delay: Duration,
    /// Maximum backoff delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}
