//! Function invocation envelope
//!
//! The host hands every request to one function. [`FunctionRequest`] is what
//! the router reads (original URL, query), [`FunctionResponse`] is what it
//! writes back. The hyper adapter lives here too.

use std::collections::HashMap;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use url::{form_urlencoded, Url};

use crate::http;
use crate::wordpress::PreviewQuery;

/// Header carrying the URL the visitor originally asked for
pub const ORIGINAL_URL_HEADER: &str = "x-original-url";

/// Inbound invocation: original URL plus query parameters
#[derive(Debug, Clone, Default)]
pub struct FunctionRequest {
    original_url: Option<String>,
    query: HashMap<String, String>,
}

impl FunctionRequest {
    pub fn new(original_url: Option<String>, query: &[(&str, &str)]) -> Self {
        Self {
            original_url: original_url.map(|raw| normalize_original_url(&raw)),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    /// Adapter for direct HTTP hosting.
    ///
    /// Query parameters come from the request URI, then from the original
    /// URL for keys the URI did not carry. Without the header the request's
    /// own path stands in when `use_request_path` is set.
    pub fn from_hyper<B>(req: &Request<B>, use_request_path: bool) -> Self {
        let header = req
            .headers()
            .get(ORIGINAL_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(normalize_original_url);

        let original_url = header.or_else(|| {
            use_request_path.then(|| {
                req.uri()
                    .path_and_query()
                    .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string())
            })
        });

        let mut query: HashMap<String, String> = req
            .uri()
            .query()
            .map(parse_query)
            .unwrap_or_default();
        if let Some((_, original_query)) = original_url.as_deref().and_then(|u| u.split_once('?')) {
            for (key, value) in parse_query(original_query) {
                query.entry(key).or_insert(value);
            }
        }

        Self {
            original_url,
            query,
        }
    }

    pub fn original_url(&self) -> Option<&str> {
        self.original_url.as_deref()
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn preview_query(&self) -> PreviewQuery {
        PreviewQuery::new(
            self.query(PreviewQuery::POST_ID_PARAM),
            self.query(PreviewQuery::POST_SLUG_PARAM),
        )
    }
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Absolute URLs are reduced to path and query; relative ones pass through.
fn normalize_original_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => match url.query() {
            Some(q) => format!("{}?{q}", url.path()),
            None => url.path().to_string(),
        },
        _ => raw.trim().to_string(),
    }
}

/// Outbound function result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionResponse {
    /// Rendered page or error text
    Text {
        status: StatusCode,
        headers: Vec<(&'static str, String)>,
        body: String,
    },
    /// Proxied bytes, passed through untouched
    Raw {
        headers: Vec<(&'static str, String)>,
        body: Bytes,
    },
}

impl FunctionResponse {
    pub fn html(body: String) -> Self {
        Self::Text {
            status: StatusCode::OK,
            headers: vec![("Content-Type", "text/html; charset=utf-8".to_string())],
            body,
        }
    }

    pub fn plain(status: StatusCode, body: &str) -> Self {
        Self::Text {
            status,
            headers: vec![("Content-Type", "text/plain; charset=utf-8".to_string())],
            body: body.to_string(),
        }
    }

    /// Pretty-printed `{"error": message}`
    pub fn error_json(status: StatusCode, message: &str) -> Self {
        let body = serde_json::to_string_pretty(&serde_json::json!({ "error": message }))
            .unwrap_or_else(|_| format!("{{\"error\": {message:?}}}"));
        Self::Text {
            status,
            headers: vec![("Content-Type", "application/json".to_string())],
            body,
        }
    }

    pub fn redirect(location: String) -> Self {
        Self::Text {
            status: StatusCode::MOVED_PERMANENTLY,
            headers: vec![("Location", location)],
            body: String::new(),
        }
    }

    pub fn raw(content_type: String, body: Bytes) -> Self {
        Self::Raw {
            headers: vec![("Content-Type", content_type)],
            body,
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Text { status, .. } => *status,
            Self::Raw { .. } => StatusCode::OK,
        }
    }

    pub fn body_len(&self) -> usize {
        match self {
            Self::Text { body, .. } => body.len(),
            Self::Raw { body, .. } => body.len(),
        }
    }

    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        let (Self::Text { headers, .. } | Self::Raw { headers, .. }) = self;
        headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Write the result back through hyper
    pub fn into_hyper(
        self,
        server_name: &str,
        enable_cors: bool,
        is_head: bool,
    ) -> Response<Full<Bytes>> {
        let status = self.status();
        let (headers, body) = match self {
            Self::Text { headers, body, .. } => (headers, Bytes::from(body)),
            Self::Raw { headers, body } => (headers, body),
        };
        http::build_response(status, &headers, body, server_name, enable_cors, is_head)
    }
}
