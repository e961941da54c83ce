//! HTTP client with connection pooling and retry logic

use bgdl_errors::{Error, NetworkError};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use crate::transfer::{calculate_backoff_delay, RetryConfig};

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub retry: RetryConfig,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large downloads
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            retry: RetryConfig::default(),
            user_agent: format!("bgdl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetConfig {
    /// Build from the `[network]` configuration section
    #[must_use]
    pub fn from_config(network: &bgdl_config::NetworkConfig) -> Self {
        let defaults = Self::default();
        Self {
            timeout: network.timeout(),
            connect_timeout: network.connect_timeout(),
            retry: RetryConfig {
                max_retries: network.retries,
                initial_delay: network.retry_delay(),
                ..RetryConfig::default()
            },
            user_agent: network.user_agent.clone().unwrap_or(defaults.user_agent),
            ..defaults
        }
    }
}

/// HTTP client wrapper with retry logic
#[derive(Debug, Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Execute a GET request with extra headers and retries
    ///
    /// Headers given here override client defaults such as the user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retry attempts,
    /// including network timeouts, connection failures, or rate limiting.
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Response, Error> {
        self.retry_request(|| {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            request.send()
        })
        .await
    }

    /// Execute a request with retries
    async fn retry_request<F, Fut>(&self, mut f: F) -> Result<Response, Error>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
    {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = calculate_backoff_delay(retry, attempt);
                tracing::debug!(attempt, ?delay, "retrying request");
                tokio::time::sleep(delay).await;
            }
            let attempts_left = attempt < retry.max_retries;
            attempt += 1;

            match f().await {
                Ok(response) => {
                    // Check for rate limiting
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(retry_after) = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                        {
                            return Err(NetworkError::RateLimited {
                                seconds: retry_after,
                            }
                            .into());
                        }
                    }

                    if response.status().is_server_error() && attempts_left {
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    // Don't retry on certain errors
                    if !attempts_left || !Self::should_retry(&e) {
                        return Err(Self::convert_error(e));
                    }
                }
            }
        }
    }

    /// Determine if an error should be retried
    fn should_retry(error: &reqwest::Error) -> bool {
        // Retry on timeout, connection errors, and server errors
        error.is_timeout()
            || error.is_connect()
            || error.status().is_none_or(|s| s.is_server_error())
    }

    fn convert_error(error: reqwest::Error) -> Error {
        if error.is_timeout() {
            NetworkError::Timeout {
                url: error
                    .url()
                    .map(std::string::ToString::to_string)
                    .unwrap_or_default(),
            }
            .into()
        } else if error.is_connect() {
            NetworkError::ConnectionRefused(error.to_string()).into()
        } else {
            NetworkError::DownloadFailed(error.to_string()).into()
        }
    }
}
