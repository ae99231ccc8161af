//! Route registrar module
//!
//! Registers the single server-rendered preview page with the host and owns
//! the page template plus the build-time collection walk.

mod collection;
mod registration;
mod render;

use std::path::Path;

pub use collection::{prefetch_serverless_items, RenderCandidate};
pub use registration::PreviewRegistration;
pub use render::{PageTemplate, PreviewPage, SinglePageRenderer};

use crate::config::{PreviewConfig, PreviewSettings};
use crate::error::PreviewError;

/// Everything the preview page needs from configuration, validated up front
#[derive(Debug, Clone)]
pub struct PreviewPlugin {
    pub registration: PreviewRegistration,
    pub settings: PreviewSettings,
    pub template: PageTemplate,
}

impl PreviewPlugin {
    /// Validate the preview configuration and load the page template.
    pub fn register(config: &PreviewConfig) -> Result<Self, PreviewError> {
        let settings = PreviewSettings::from_config(config)?;
        let registration = PreviewRegistration::from_config(config)?;
        let template = match config.template_file.as_deref() {
            Some(path) if !path.is_empty() => PageTemplate::load(Path::new(path))?,
            _ => PageTemplate::default(),
        };
        Ok(Self {
            registration,
            settings,
            template,
        })
    }
}
