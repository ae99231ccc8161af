//! Outbound HTTP module
//!
//! Every call to the CMS or the live site goes through the [`Fetch`] trait so
//! the gateway and the proxy can be exercised against in-memory doubles.

mod http_fetcher;

pub use http_fetcher::HttpFetcher;

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::PreviewError;

/// A fully buffered upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Final URL the response came from
    pub url: String,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Turn a non-2xx status into [`PreviewError::UpstreamHttp`]
    pub fn error_for_status(self) -> Result<Self, PreviewError> {
        if self.status.is_success() {
            return Ok(self);
        }
        Err(PreviewError::UpstreamHttp {
            status: self.status,
            status_text: self.status.canonical_reason().unwrap_or_default().to_string(),
            url: self.url,
        })
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PreviewError> {
        serde_json::from_slice(&self.body).map_err(|source| PreviewError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

/// Outbound GET capability
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, PreviewError>;
}

/// GET `url`, fail on non-2xx, decode JSON.
pub async fn fetch_json<T: DeserializeOwned>(
    fetcher: &dyn Fetch,
    url: &str,
) -> Result<T, PreviewError> {
    fetcher.get(url).await?.error_for_status()?.json()
}
