// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    pub preview: PreviewConfig,
    pub fetch: FetchConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    /// Fall back to the request's own path when `x-original-url` is absent.
    /// Off by default, so a bare request renders the digest.
    pub use_request_path: bool,
}

/// Routes served before preview routing
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RoutesConfig {
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Preview configuration as read from file/environment
#[derive(Debug, Deserialize, Clone)]
pub struct PreviewConfig {
    /// WordPress site root, e.g. `https://cms.example`
    #[serde(default)]
    pub cms_base_url: Option<String>,
    /// Live companion site that receives non-preview traffic
    #[serde(default)]
    pub live_resource_base_url: Option<String>,
    /// Tag limiting the digest listing (numeric id or slug)
    #[serde(default)]
    pub preview_tag: Option<TagRef>,
    #[serde(default)]
    pub resource_strategy: ResourceStrategy,
    #[serde(default = "default_function_name")]
    pub function_name: String,
    #[serde(default = "default_page_path")]
    pub page_path: String,
    /// HTML page template (built-in template when unset)
    #[serde(default)]
    pub template_file: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cms_base_url: None,
            live_resource_base_url: None,
            preview_tag: None,
            resource_strategy: ResourceStrategy::default(),
            function_name: default_function_name(),
            page_path: default_page_path(),
            template_file: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_function_name() -> String {
    "possum".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_page_path() -> String {
    "/GeneratePreviewModePath".to_string()
}

/// Digest tag reference
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TagRef {
    Id(u64),
    Slug(String),
}

impl TagRef {
    /// Numeric strings from the environment still count as ids.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Slug(slug) => slug
                .trim()
                .parse::<u64>()
                .map_or_else(|_| Self::Slug(slug.trim().to_string()), Self::Id),
            id @ Self::Id(_) => id,
        }
    }
}

/// What to do with requests that are not preview content
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStrategy {
    /// Fetch from the live site and pass bytes through
    #[default]
    Proxy,
    /// Answer 301 pointing at the live site
    Redirect,
}

/// Outbound fetch configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Extra attempts after a network failure
    pub retries: usize,
    pub retry_delay_ms: u64,
    pub user_agent: String,
}
