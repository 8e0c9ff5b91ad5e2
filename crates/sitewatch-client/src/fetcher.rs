use std::time::Duration;

use reqwest::Client;
use sitewatch_core::error::AppError;
use sitewatch_core::traits::Fetcher;

/// HTTP fetcher using reqwest.
///
/// Downloads raw page bytes with a fixed User-Agent and a per-request
/// timeout. Non-2xx responses are transport errors.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(concat!("sitewatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout)
            } else if e.is_connect() {
                AppError::Transport(format!("Connection failed: {e}"))
            } else {
                AppError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout)
            } else {
                AppError::Transport(format!("Failed to read response body: {e}"))
            }
        })?;

        tracing::debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body.to_vec())
    }
}
