// WordPress gateway
// Builds REST query URLs, fetches them and shapes the results

use std::sync::Arc;

use url::form_urlencoded;

use super::digest::DigestTemplate;
use super::types::{PostRecord, PostSummary, PreviewQuery, TagRow};
use crate::config::{PreviewSettings, TagRef};
use crate::error::PreviewError;
use crate::fetch::{fetch_json, Fetch};

/// Fixed digest page size; no pagination beyond it
pub const DIGEST_PAGE_SIZE: u32 = 100;

const API_ROOT: &str = "/wp-json/wp/v2";

/// Gateway to the WordPress REST API
pub struct WordPressGateway {
    settings: Arc<PreviewSettings>,
    fetcher: Arc<dyn Fetch>,
    digest: DigestTemplate,
}

impl WordPressGateway {
    pub fn new(settings: Arc<PreviewSettings>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            settings,
            fetcher,
            digest: DigestTemplate::default(),
        }
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Resolve a preview query to a post: id first, then slug, else the digest.
    pub async fn resolve_post(&self, query: &PreviewQuery) -> Result<PostRecord, PreviewError> {
        if let Some(id) = &query.post_id {
            return self.post_by_id(id).await;
        }
        if let Some(slug) = &query.post_slug {
            return self.post_by_slug(slug).await;
        }
        self.digest().await
    }

    pub async fn post_by_id(&self, id: &str) -> Result<PostRecord, PreviewError> {
        let url = post_by_id_url(&self.settings.cms_base_url, id, &cachebust());
        let value: serde_json::Value = fetch_json(self.fetcher.as_ref(), &url).await?;
        Ok(PostRecord::new(value))
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<PostRecord, PreviewError> {
        let url = post_by_slug_url(&self.settings.cms_base_url, slug, &cachebust());
        let rows: Vec<serde_json::Value> = fetch_json(self.fetcher.as_ref(), &url).await?;
        rows.into_iter()
            .next()
            .map(PostRecord::new)
            .ok_or_else(|| PreviewError::SlugNotFound(slug.to_string()))
    }

    /// Light-weight slug probe used by the router; `None` when nothing matches.
    pub async fn find_post_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PostSummary>, PreviewError> {
        let url = slug_probe_url(&self.settings.cms_base_url, slug, &cachebust());
        let rows: Vec<PostSummary> = fetch_json(self.fetcher.as_ref(), &url).await?;
        Ok(rows.into_iter().next())
    }

    /// Digest of every post under the preview tag (or every post when no tag
    /// is configured).
    pub async fn digest(&self) -> Result<PostRecord, PreviewError> {
        let tag_id = match &self.settings.preview_tag {
            Some(tag) => Some(self.resolve_tag_id(tag).await?),
            None => None,
        };
        let url = digest_url(&self.settings.cms_base_url, tag_id, &cachebust());
        let posts: Vec<PostSummary> = fetch_json(self.fetcher.as_ref(), &url).await?;
        Ok(self.digest.build(&posts))
    }

    pub async fn resolve_tag_id(&self, tag: &TagRef) -> Result<u64, PreviewError> {
        match tag {
            TagRef::Id(id) => Ok(*id),
            TagRef::Slug(slug) => {
                let url = tag_lookup_url(&self.settings.cms_base_url, slug, &cachebust());
                let rows: Vec<TagRow> = fetch_json(self.fetcher.as_ref(), &url).await?;
                rows.first()
                    .map(|row| row.id)
                    .ok_or_else(|| PreviewError::TagNotFound(slug.clone()))
            }
        }
    }
}

/// Random value that defeats intermediate HTTP caches
fn cachebust() -> String {
    rand::random::<f64>().to_string()
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn post_by_id_url(base: &str, id: &str, bust: &str) -> String {
    format!("{base}{API_ROOT}/posts/{}?_embed&cachebust={bust}", encode(id))
}

pub fn post_by_slug_url(base: &str, slug: &str, bust: &str) -> String {
    format!(
        "{base}{API_ROOT}/posts?slug={}&_embed&cachebust={bust}",
        encode(slug)
    )
}

pub fn slug_probe_url(base: &str, slug: &str, bust: &str) -> String {
    format!(
        "{base}{API_ROOT}/posts?slug={}&_fields=id,slug&cachebust={bust}",
        encode(slug)
    )
}

pub fn tag_lookup_url(base: &str, tag_slug: &str, bust: &str) -> String {
    format!(
        "{base}{API_ROOT}/tags?slug={}&_fields=id&cachebust={bust}",
        encode(tag_slug)
    )
}

pub fn digest_url(base: &str, tag_id: Option<u64>, bust: &str) -> String {
    let tags = tag_id.map(|id| format!("tags={id}&")).unwrap_or_default();
    format!(
        "{base}{API_ROOT}/posts?{tags}per_page={DIGEST_PAGE_SIZE}&orderby=modified&_fields=title,modified,id,slug&cachebust={bust}"
    )
}
