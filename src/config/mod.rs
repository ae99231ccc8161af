// Configuration module entry point
// Loads layered configuration and builds the immutable preview settings

mod settings;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use settings::PreviewSettings;
pub use state::AppState;
pub use types::{Config, FetchConfig, PreviewConfig, ResourceStrategy, RoutesConfig, TagRef};

/// Environment variable prefix, e.g. `WPPREVIEW_PREVIEW__CMS_BASE_URL`
const ENV_PREFIX: &str = "WPPREVIEW";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "wp-preview-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.use_request_path", false)?
            .set_default("preview.function_name", "possum")?
            .set_default("preview.page_path", "/GeneratePreviewModePath")?
            .set_default("preview.resource_strategy", "proxy")?
            .set_default("fetch.retries", 2)?
            .set_default("fetch.retry_delay_ms", 500)?
            .set_default(
                "fetch.user_agent",
                concat!("wp-preview-server/", env!("CARGO_PKG_VERSION")),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
