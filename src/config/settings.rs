// Preview settings module
// Immutable, validated view of the preview configuration

use url::Url;

use super::types::{PreviewConfig, ResourceStrategy, TagRef};
use crate::error::PreviewError;

/// Settings shared by the router and the WordPress gateway.
///
/// Built once at startup; `cms_base_url` is always present and never ends
/// with a slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSettings {
    pub cms_base_url: String,
    pub live_resource_base_url: Option<String>,
    pub preview_tag: Option<TagRef>,
    pub resource_strategy: ResourceStrategy,
}

impl PreviewSettings {
    /// Validate the raw configuration. Fails fast on a missing or malformed
    /// CMS url so the server never starts half-configured.
    pub fn from_config(config: &PreviewConfig) -> Result<Self, PreviewError> {
        let cms_base_url = config
            .cms_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PreviewError::ConfigurationMissing("preview.cms_base_url".to_string()))?;

        let live_resource_base_url = config
            .live_resource_base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| validate_base_url("preview.live_resource_base_url", s))
            .transpose()?;

        let preview_tag = config.preview_tag.clone().map(TagRef::normalized).filter(|tag| {
            !matches!(tag, TagRef::Slug(slug) if slug.is_empty())
        });

        Ok(Self {
            cms_base_url: validate_base_url("preview.cms_base_url", cms_base_url)?,
            live_resource_base_url,
            preview_tag,
            resource_strategy: config.resource_strategy,
        })
    }

    /// Settings pointing at a CMS only; handy for tests and tooling.
    #[cfg(test)]
    pub fn for_cms(cms_base_url: &str) -> Self {
        Self {
            cms_base_url: cms_base_url.trim_end_matches('/').to_string(),
            live_resource_base_url: None,
            preview_tag: None,
            resource_strategy: ResourceStrategy::Proxy,
        }
    }
}

fn validate_base_url(key: &str, raw: &str) -> Result<String, PreviewError> {
    let parsed = Url::parse(raw)
        .map_err(|e| PreviewError::ConfigurationMissing(format!("{key} is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PreviewError::ConfigurationMissing(format!(
            "{key} must be an http(s) URL"
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_config(cms: Option<&str>) -> PreviewConfig {
        PreviewConfig {
            cms_base_url: cms.map(String::from),
            ..PreviewConfig::default()
        }
    }

    #[test]
    fn test_missing_cms_url_is_fatal() {
        let err = PreviewSettings::from_config(&preview_config(None)).unwrap_err();
        assert!(matches!(err, PreviewError::ConfigurationMissing(_)));

        let err = PreviewSettings::from_config(&preview_config(Some("   "))).unwrap_err();
        assert!(matches!(err, PreviewError::ConfigurationMissing(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let settings =
            PreviewSettings::from_config(&preview_config(Some("https://cms.example/"))).unwrap();
        assert_eq!(settings.cms_base_url, "https://cms.example");
        assert!(settings.live_resource_base_url.is_none());
    }

    #[test]
    fn test_invalid_urls_rejected() {
        assert!(PreviewSettings::from_config(&preview_config(Some("not a url"))).is_err());
        assert!(PreviewSettings::from_config(&preview_config(Some("ftp://cms.example"))).is_err());

        let mut cfg = preview_config(Some("https://cms.example"));
        cfg.live_resource_base_url = Some("::nope".to_string());
        assert!(PreviewSettings::from_config(&cfg).is_err());
    }

    #[test]
    fn test_tag_normalization() {
        let mut cfg = preview_config(Some("https://cms.example"));
        cfg.preview_tag = Some(TagRef::Slug("20".to_string()));
        let settings = PreviewSettings::from_config(&cfg).unwrap();
        assert_eq!(settings.preview_tag, Some(TagRef::Id(20)));

        cfg.preview_tag = Some(TagRef::Slug(" preview ".to_string()));
        let settings = PreviewSettings::from_config(&cfg).unwrap();
        assert_eq!(settings.preview_tag, Some(TagRef::Slug("preview".to_string())));

        cfg.preview_tag = Some(TagRef::Slug(String::new()));
        let settings = PreviewSettings::from_config(&cfg).unwrap();
        assert_eq!(settings.preview_tag, None);
    }
}
