// Single-page registration
// The function name / page path pair the host routes preview traffic through

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::PreviewConfig;
use crate::error::PreviewError;

/// How the host should treat redirects for the preview function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectHandling {
    /// The function answers every path itself
    None,
}

/// Registration of the one server-rendered preview page.
///
/// Built once from configuration and passed around by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRegistration {
    pub function_name: String,
    pub page_path: String,
    pub input_dir: String,
    pub functions_dir: String,
    pub redirects: RedirectHandling,
    /// Copy everything, render nothing statically
    pub copy_filter: Vec<String>,
}

impl PreviewRegistration {
    pub fn new(function_name: &str, page_path: &str) -> Result<Self, PreviewError> {
        let function_name = function_name.trim();
        if function_name.is_empty() {
            return Err(PreviewError::ConfigurationMissing(
                "preview.function_name".to_string(),
            ));
        }
        if !page_path.starts_with('/') {
            return Err(PreviewError::ConfigurationMissing(format!(
                "preview.page_path must start with '/': {page_path}"
            )));
        }
        Ok(Self {
            function_name: function_name.to_string(),
            page_path: page_path.to_string(),
            input_dir: String::new(),
            functions_dir: String::new(),
            redirects: RedirectHandling::None,
            copy_filter: vec!["**/*".to_string(), "!**".to_string()],
        })
    }

    pub fn from_config(config: &PreviewConfig) -> Result<Self, PreviewError> {
        Self::new(&config.function_name, &config.page_path)
    }

    /// Data a page merges in to opt into preview rendering:
    /// `{"permalink": {<function_name>: <page_path>}}`
    pub fn permalink_data(&self) -> Value {
        json!({
            "permalink": { self.function_name.as_str(): self.page_path.as_str() }
        })
    }

    /// Options handed to the host's bundler plugin
    pub fn host_plugin_options(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
