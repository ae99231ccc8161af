//! Routing outcome resolution
//!
//! Completes a [`Decision`] into an [`Outcome`]; the only I/O is the slug
//! probe against the CMS.

use hyper::StatusCode;

use super::decision::{decide, Decision};
use crate::config::{PreviewSettings, ResourceStrategy};
use crate::error::PreviewError;
use crate::handler::FunctionRequest;
use crate::wordpress::{PreviewQuery, WordPressGateway};

/// Final routing result. A request gets exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    RenderSingle(PreviewQuery),
    RenderDigest,
    /// Fetch `path` from the live site and stream it back
    ProxyResource(String),
    /// 301 to `path` on the live site
    Redirect(String),
    /// Not preview content and no live site to send it to
    NotConfigured,
    Error { status: StatusCode, message: String },
}

impl Outcome {
    /// Short label for the access log
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RenderSingle(_) => "single",
            Self::RenderDigest => "digest",
            Self::ProxyResource(_) => "proxy",
            Self::Redirect(_) => "redirect",
            Self::NotConfigured => "not_configured",
            Self::Error { .. } => "error",
        }
    }

    fn from_error(err: &PreviewError) -> Self {
        Self::Error {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// Route `request` to its outcome.
pub async fn route(request: &FunctionRequest, gateway: &WordPressGateway) -> Outcome {
    match decide(request) {
        Decision::Single(query) => Outcome::RenderSingle(query),
        Decision::Digest => Outcome::RenderDigest,
        Decision::SlugCandidate { slug, path } => match gateway.find_post_by_slug(&slug).await {
            Ok(Some(post)) => Outcome::RenderSingle(PreviewQuery {
                post_id: Some(post.id.to_string()),
                post_slug: Some(if post.slug.is_empty() { slug } else { post.slug }),
            }),
            Ok(None) => fallback(path, gateway.settings()),
            Err(err) => Outcome::from_error(&err),
        },
        Decision::Passthrough { path } => fallback(path, gateway.settings()),
    }
}

/// Where a request that is not preview content goes
fn fallback(path: String, settings: &PreviewSettings) -> Outcome {
    if settings.live_resource_base_url.is_none() {
        return Outcome::NotConfigured;
    }
    match settings.resource_strategy {
        ResourceStrategy::Proxy => Outcome::ProxyResource(path),
        ResourceStrategy::Redirect => Outcome::Redirect(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FakeFetcher;
    use serde_json::json;
    use std::sync::Arc;

    fn gateway(
        fetcher: FakeFetcher,
        live: Option<&str>,
        strategy: ResourceStrategy,
    ) -> (WordPressGateway, Arc<FakeFetcher>) {
        let fetcher = Arc::new(fetcher);
        let mut settings = PreviewSettings::for_cms("https://cms.example");
        settings.live_resource_base_url = live.map(String::from);
        settings.resource_strategy = strategy;
        (WordPressGateway::new(Arc::new(settings), fetcher.clone()), fetcher)
    }

    fn request(original: &str) -> FunctionRequest {
        FunctionRequest::new(Some(original.to_string()), &[])
    }

    #[tokio::test]
    async fn test_postid_never_touches_cms() {
        let (gw, fetcher) = gateway(FakeFetcher::new(), None, ResourceStrategy::Proxy);
        let req = FunctionRequest::new(Some("/styles.css".to_string()), &[("postid", "42")]);
        assert_eq!(
            route(&req, &gw).await,
            Outcome::RenderSingle(PreviewQuery::new(Some("42"), None))
        );
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_root_is_digest() {
        let (gw, _) = gateway(FakeFetcher::new(), None, ResourceStrategy::Proxy);
        assert_eq!(route(&request("/"), &gw).await, Outcome::RenderDigest);
    }

    #[tokio::test]
    async fn test_matching_slug_renders_single_with_id_and_slug() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts?slug=my-post&_fields=id,slug",
            &json!([{"id": 77, "slug": "my-post"}]),
        );
        let (gw, _) = gateway(fetcher, None, ResourceStrategy::Proxy);
        assert_eq!(
            route(&request("/my-post"), &gw).await,
            Outcome::RenderSingle(PreviewQuery::new(Some("77"), Some("my-post")))
        );
    }

    #[tokio::test]
    async fn test_unmatched_slug_without_live_site_is_405() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts?slug=my-post&_fields=id,slug",
            &json!([]),
        );
        let (gw, _) = gateway(fetcher, None, ResourceStrategy::Proxy);
        assert_eq!(route(&request("/my-post"), &gw).await, Outcome::NotConfigured);
    }

    #[tokio::test]
    async fn test_asset_path_skips_lookup_and_proxies() {
        let live = Some("https://live.example");
        let (gw, fetcher) = gateway(FakeFetcher::new(), live, ResourceStrategy::Proxy);
        assert_eq!(
            route(&request("/styles.css"), &gw).await,
            Outcome::ProxyResource("/styles.css".to_string())
        );
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_strategy() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts?slug=about&_fields=id,slug",
            &json!([]),
        );
        let live = Some("https://live.example");
        let (gw, _) = gateway(fetcher, live, ResourceStrategy::Redirect);
        assert_eq!(
            route(&request("/about?x=1"), &gw).await,
            Outcome::Redirect("/about?x=1".to_string())
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_carries_upstream_status() {
        let fetcher = FakeFetcher::new().status(
            "https://cms.example/wp-json/wp/v2/posts?slug=broken&_fields=id,slug",
            StatusCode::SERVICE_UNAVAILABLE,
        );
        let (gw, _) = gateway(fetcher, Some("https://live.example"), ResourceStrategy::Proxy);
        match route(&request("/broken"), &gw).await {
            Outcome::Error { status, message } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert!(message.starts_with("503 - Service Unavailable - "));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
