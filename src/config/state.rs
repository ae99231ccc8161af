// Application state module
// Immutable runtime state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::error::PreviewError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::preview::{PreviewPage, PreviewPlugin, PreviewRegistration, SinglePageRenderer};
use crate::wordpress::WordPressGateway;

/// Application state
pub struct AppState {
    pub config: Config,
    pub registration: PreviewRegistration,
    pub gateway: Arc<WordPressGateway>,
    pub fetcher: Arc<dyn Fetch>,
    pub renderer: Arc<dyn SinglePageRenderer>,
}

impl AppState {
    /// Validate configuration and wire up the outbound stack.
    /// Fails when the CMS url is missing or the template cannot be loaded.
    pub fn new(config: Config) -> Result<Self, PreviewError> {
        let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Self::assemble(config, fetcher)
    }

    /// Build state around an existing fetcher
    pub fn assemble(config: Config, fetcher: Arc<dyn Fetch>) -> Result<Self, PreviewError> {
        let plugin = PreviewPlugin::register(&config.preview)?;
        let gateway = Arc::new(WordPressGateway::new(
            Arc::new(plugin.settings),
            Arc::clone(&fetcher),
        ));
        let renderer: Arc<dyn SinglePageRenderer> =
            Arc::new(PreviewPage::new(Arc::clone(&gateway), plugin.template));

        Ok(Self {
            config,
            registration: plugin.registration,
            gateway,
            fetcher,
            renderer,
        })
    }

    /// Whether access logging is on
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
