//! Error types for the preview server
//!
//! Every request-time failure ends up here and is turned into a response
//! exactly once, by the request handler.

use hyper::StatusCode;

/// Preview server error type
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    /// Upstream (CMS or live site) answered with a non-2xx status
    #[error("{} - {status_text} - {url}", .status.as_u16())]
    UpstreamHttp {
        status: StatusCode,
        status_text: String,
        url: String,
    },

    /// Slug lookup returned zero rows
    #[error("slug not found: {0}")]
    SlugNotFound(String),

    /// Tag slug lookup returned zero rows
    #[error("tag not found: {0}")]
    TagNotFound(String),

    /// Required setting absent at startup
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// A resource request fell through but no live site is configured
    #[error("resourceUrl not defined")]
    ProxyNotConfigured,

    /// Network level failure talking to an upstream
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Upstream body could not be decoded as the expected JSON
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Page template could not be loaded
    #[error("template error: {0}")]
    Template(String),
}

impl PreviewError {
    /// HTTP status to answer with: the upstream status when known, 405 for a
    /// missing live site, 500 otherwise.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UpstreamHttp { status, .. } => *status,
            Self::ProxyNotConfigured => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Only network failures are worth another attempt.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_matches_fetch_error_format() {
        let err = PreviewError::UpstreamHttp {
            status: StatusCode::NOT_FOUND,
            status_text: "Not Found".to_string(),
            url: "https://cms.example/wp-json/wp/v2/posts/9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "404 - Not Found - https://cms.example/wp-json/wp/v2/posts/9"
        );
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PreviewError::ProxyNotConfigured.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            PreviewError::SlugNotFound("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PreviewError::TagNotFound("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_transport_is_transient() {
        let transport = PreviewError::Transport {
            url: "https://cms.example".to_string(),
            message: "connection reset".to_string(),
        };
        assert!(transport.is_transient());
        assert!(!PreviewError::SlugNotFound("a".to_string()).is_transient());
    }
}
