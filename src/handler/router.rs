//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, health
//! probes, preview routing and execution of the routing outcome.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};

use super::invocation::{FunctionRequest, FunctionResponse};
use super::proxy;
use crate::config::{AppState, RoutesConfig};
use crate::error::PreviewError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Outcome};
use crate::wordpress::PreviewQuery;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let is_head = *method == Method::HEAD;

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return Ok(resp);
    }

    // 2. Log headers if enabled
    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    // 3. Health probes answer before any CMS traffic
    if let Some(resp) = check_health(req.uri().path(), &state.config.routes) {
        return Ok(resp);
    }

    // 4. Route and execute
    let request = FunctionRequest::from_hyper(&req, state.config.http.use_request_path);
    let (outcome, response) = invoke(&request, &state).await;

    if state.access_log() {
        let entry = access_entry(&req, &request, &outcome, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    let http_config = &state.config.http;
    Ok(response.into_hyper(&http_config.server_name, http_config.enable_cors, is_head))
}

/// Route one invocation and produce its response
pub async fn invoke(request: &FunctionRequest, state: &AppState) -> (Outcome, FunctionResponse) {
    let outcome = routing::route(request, &state.gateway).await;
    let response = execute(&outcome, state).await;
    (outcome, response)
}

async fn execute(outcome: &Outcome, state: &AppState) -> FunctionResponse {
    match outcome {
        Outcome::RenderSingle(query) => render(query, outcome.label(), state).await,
        Outcome::RenderDigest => render(&PreviewQuery::default(), outcome.label(), state).await,
        Outcome::ProxyResource(path) => {
            let Some(live) = state.gateway.settings().live_resource_base_url.as_deref() else {
                return not_configured();
            };
            proxy::fetch_resource(state.fetcher.as_ref(), live, path)
                .await
                .unwrap_or_else(|err| failure(outcome.label(), &err))
        }
        Outcome::Redirect(path) => {
            let Some(live) = state.gateway.settings().live_resource_base_url.as_deref() else {
                return not_configured();
            };
            proxy::redirect_resource(live, path)
        }
        Outcome::NotConfigured => not_configured(),
        Outcome::Error { status, message } => {
            logger::log_upstream_error(outcome.label(), message);
            FunctionResponse::error_json(*status, message)
        }
    }
}

async fn render(query: &PreviewQuery, label: &str, state: &AppState) -> FunctionResponse {
    match state.renderer.render(query).await {
        Ok(html) => FunctionResponse::html(html),
        Err(err) => failure(label, &err),
    }
}

fn failure(label: &str, err: &PreviewError) -> FunctionResponse {
    logger::log_upstream_error(label, err);
    FunctionResponse::error_json(err.status(), &err.to_string())
}

fn not_configured() -> FunctionResponse {
    FunctionResponse::plain(
        StatusCode::METHOD_NOT_ALLOWED,
        &PreviewError::ProxyNotConfigured.to_string(),
    )
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn check_health(path: &str, routes: &RoutesConfig) -> Option<Response<Full<Bytes>>> {
    let health = &routes.health;
    (health.enabled && (path == health.liveness_path || path == health.readiness_path))
        .then(|| http::build_health_response("ok"))
}

fn access_entry<B>(
    req: &Request<B>,
    request: &FunctionRequest,
    outcome: &Outcome,
    response: &FunctionResponse,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    let original = request.original_url().unwrap_or_else(|| req.uri().path());
    let (path, query) = match original.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (original.to_string(), req.uri().query().map(ToString::to_string)),
    };

    let mut entry = AccessLogEntry::new(peer_addr.ip().to_string(), req.method().to_string(), path);
    entry.query = query;
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body_len();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry.outcome = outcome.label();
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ResourceStrategy};
    use crate::fetch::testing::FakeFetcher;
    use crate::fetch::Fetch;
    use http_body_util::BodyExt;
    use serde_json::json;

    const CMS: &str = "https://cms.example";

    fn state(
        fetcher: FakeFetcher,
        live: Option<&str>,
        strategy: ResourceStrategy,
    ) -> (AppState, Arc<FakeFetcher>) {
        let mut config = Config::load_from("does-not-exist-preview-config").unwrap();
        config.logging.access_log = false;
        config.preview.cms_base_url = Some(CMS.to_string());
        config.preview.live_resource_base_url = live.map(String::from);
        config.preview.resource_strategy = strategy;
        let fetcher = Arc::new(fetcher);
        let shared: Arc<dyn Fetch> = fetcher.clone();
        (AppState::assemble(config, shared).unwrap(), fetcher)
    }

    fn body_text(response: &FunctionResponse) -> &str {
        match response {
            FunctionResponse::Text { body, .. } => body,
            FunctionResponse::Raw { .. } => panic!("expected text response"),
        }
    }

    #[tokio::test]
    async fn test_root_renders_empty_digest() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts?per_page=100&orderby=modified&_fields=title,modified,id,slug",
            &json!([]),
        );
        let (state, _) = state(fetcher, None, ResourceStrategy::Proxy);

        let request = FunctionRequest::new(Some("/".to_string()), &[]);
        let (outcome, response) = invoke(&request, &state).await;

        assert_eq!(outcome, Outcome::RenderDigest);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(&response).contains("No content to preview"));
        assert!(body_text(&response).contains("1970-01-01T00:00:00"));
    }

    #[tokio::test]
    async fn test_postid_renders_post_verbatim() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts/42?_embed",
            &json!({"id": 42, "title": {"rendered": "Answer"}, "content": {"rendered": "<p>forty-two</p>"}}),
        );
        let (state, fetcher) = state(fetcher, None, ResourceStrategy::Proxy);

        let request = FunctionRequest::new(Some("/anything.css".to_string()), &[("postid", "42")]);
        let (outcome, response) = invoke(&request, &state).await;

        assert_eq!(outcome, Outcome::RenderSingle(PreviewQuery::new(Some("42"), None)));
        assert!(body_text(&response).contains("<p>forty-two</p>"));
        assert_eq!(
            fetcher.stripped_calls(),
            vec!["https://cms.example/wp-json/wp/v2/posts/42?_embed"]
        );
    }

    #[tokio::test]
    async fn test_unmatched_slug_without_live_site_is_405() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts?slug=my-post&_fields=id,slug",
            &json!([]),
        );
        let (state, _) = state(fetcher, None, ResourceStrategy::Proxy);

        let request = FunctionRequest::new(Some("/my-post".to_string()), &[]);
        let (_, response) = invoke(&request, &state).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_text(&response), "resourceUrl not defined");
    }

    #[tokio::test]
    async fn test_cms_405_on_slug_lookup_stays_json() {
        let fetcher = FakeFetcher::new().status(
            "https://cms.example/wp-json/wp/v2/posts?slug=my-post&_fields=id,slug",
            StatusCode::METHOD_NOT_ALLOWED,
        );
        let live = Some("https://live.example");
        let (state, _) = state(fetcher, live, ResourceStrategy::Proxy);

        let request = FunctionRequest::new(Some("/my-post".to_string()), &[]);
        let (outcome, response) = invoke(&request, &state).await;

        assert_eq!(outcome.label(), "error");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("content-type"), Some("application/json"));
        let parsed: serde_json::Value = serde_json::from_str(body_text(&response)).unwrap();
        let message = parsed["error"].as_str().unwrap();
        assert!(message.starts_with("405 - Method Not Allowed - https://cms.example/"));
        assert!(message.contains("slug=my-post"));
    }

    #[tokio::test]
    async fn test_stylesheet_is_proxied() {
        let fetcher = FakeFetcher::new().raw(
            "https://live.example/styles.css",
            StatusCode::OK,
            Some("text/css"),
            b"body{}",
        );
        let live = Some("https://live.example");
        let (state, fetcher) = state(fetcher, live, ResourceStrategy::Proxy);

        let request = FunctionRequest::new(Some("/styles.css".to_string()), &[]);
        let (outcome, response) = invoke(&request, &state).await;

        assert_eq!(outcome, Outcome::ProxyResource("/styles.css".to_string()));
        let expected = FunctionResponse::raw("text/css".to_string(), Bytes::from_static(b"body{}"));
        assert_eq!(response, expected);
        assert_eq!(fetcher.calls(), vec!["https://live.example/styles.css"]);
    }

    #[tokio::test]
    async fn test_redirect_strategy() {
        let live = Some("https://live.example");
        let (state, fetcher) = state(FakeFetcher::new(), live, ResourceStrategy::Redirect);

        let request = FunctionRequest::new(Some("/logo.png".to_string()), &[]);
        let (outcome, response) = invoke(&request, &state).await;

        assert_eq!(outcome, Outcome::Redirect("/logo.png".to_string()));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.header("location"), Some("https://live.example/logo.png"));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_becomes_json() {
        let fetcher = FakeFetcher::new().status(
            "https://cms.example/wp-json/wp/v2/posts/9?_embed",
            StatusCode::NOT_FOUND,
        );
        let (state, _) = state(fetcher, None, ResourceStrategy::Proxy);

        let request = FunctionRequest::new(None, &[("postid", "9")]);
        let (_, response) = invoke(&request, &state).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let parsed: serde_json::Value = serde_json::from_str(body_text(&response)).unwrap();
        let message = parsed["error"].as_str().unwrap();
        assert!(message
            .starts_with("404 - Not Found - https://cms.example/wp-json/wp/v2/posts/9?_embed"));
    }

    #[tokio::test]
    async fn test_hyper_entry_health_and_methods() {
        let (state, fetcher) = state(FakeFetcher::new(), None, ResourceStrategy::Proxy);
        let state = Arc::new(state);
        let peer: SocketAddr = "127.0.0.1:9000".parse().unwrap();

        let health = Request::get("/healthz").body(()).unwrap();
        let resp = handle_request(health, Arc::clone(&state), peer).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.into_body().collect().await.unwrap().to_bytes(), "ok");

        let post = Request::post("/").body(()).unwrap();
        let resp = handle_request(post, Arc::clone(&state), peer).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_hyper_entry_without_header_renders_digest() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts?per_page=100&orderby=modified&_fields=title,modified,id,slug",
            &json!([]),
        );
        let (state, fetcher) = state(fetcher, None, ResourceStrategy::Proxy);

        let req = Request::get("/api/possum").body(()).unwrap();
        let resp = handle_request(req, Arc::new(state), "127.0.0.1:9000".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("No content to preview"));
        let calls = fetcher.stripped_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].ends_with("/posts?per_page=100&orderby=modified&_fields=title,modified,id,slug"));
    }

    #[tokio::test]
    async fn test_hyper_entry_uses_original_url_header() {
        let fetcher = FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts/5?_embed",
            &json!({"id": 5, "title": {"rendered": "Five"}, "content": {"rendered": "<p>5</p>"}}),
        );
        let (state, _) = state(fetcher, None, ResourceStrategy::Proxy);

        let req = Request::head("/api/possum")
            .header("x-original-url", "https://site.example/some/page?postid=5")
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::new(state), "127.0.0.1:9000".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_ne!(resp.headers()["content-length"], "0");
        assert!(resp.into_body().collect().await.unwrap().to_bytes().is_empty());
    }
}
