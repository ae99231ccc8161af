// reqwest-backed fetcher with a fixed retry policy

use std::time::Duration;

use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};

use super::{Fetch, UpstreamResponse};
use crate::config::FetchConfig;
use crate::error::PreviewError;
use crate::logger;

/// Production [`Fetch`] implementation.
///
/// Network failures are retried `retries` times with a constant delay; HTTP
/// error statuses are returned as-is for the caller to judge.
pub struct HttpFetcher {
    client: reqwest::Client,
    retries: usize,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, PreviewError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PreviewError::ConfigurationMissing(format!("http client: {e}")))?;
        Ok(Self {
            client,
            retries: config.retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    async fn get_once(&self, url: &str) -> Result<UpstreamResponse, PreviewError> {
        let transport = |e: reqwest::Error| PreviewError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.bytes().await.map_err(transport)?;

        Ok(UpstreamResponse {
            url: final_url,
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, PreviewError> {
        let policy = ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(self.retries);

        (|| self.get_once(url))
            .retry(policy)
            .when(PreviewError::is_transient)
            .notify(|err: &PreviewError, delay: Duration| {
                logger::log_upstream_retry(url, err, delay);
            })
            .await
    }
}
