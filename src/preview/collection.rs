//! Build-time collection walk
//!
//! Items that are rendered on demand carry a `serverless.query` object in
//! their data and have no static output path. Their CMS data is fetched once
//! per build and handed to a caller-supplied mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PreviewError;
use crate::wordpress::{PostRecord, PreviewQuery, WordPressGateway};

/// One item of the host's page collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderCandidate {
    /// Static output path; `None` for items rendered on demand
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl RenderCandidate {
    /// Preview query of an on-demand item, `None` for statically rendered ones
    pub fn serverless_query(&self) -> Option<PreviewQuery> {
        if self.output_path.as_deref().is_some_and(|p| !p.is_empty()) {
            return None;
        }
        let query = self.data.get("serverless")?.get("query")?.as_object()?;
        let param = |name: &str| query.get(name).and_then(Value::as_str);
        Some(PreviewQuery::new(
            param(PreviewQuery::POST_ID_PARAM),
            param(PreviewQuery::POST_SLUG_PARAM),
        ))
    }

    /// Copy the post's title and content into `data`, keeping the whole
    /// record under `post`
    pub fn fill_from(&mut self, post: &PostRecord) {
        if let Value::Object(data) = &mut self.data {
            data.insert("title".to_string(), Value::String(post.title().to_string()));
            data.insert("content".to_string(), Value::String(post.content().to_string()));
            data.insert("post".to_string(), post.as_value().clone());
        }
    }
}

/// Resolve the post of every on-demand item and call `map` once for each.
///
/// Returns how many items were mapped. The first gateway failure aborts the
/// walk.
pub async fn prefetch_serverless_items<F>(
    items: &mut [RenderCandidate],
    gateway: &WordPressGateway,
    mut map: F,
) -> Result<usize, PreviewError>
where
    F: FnMut(&mut RenderCandidate, &PostRecord),
{
    let mut mapped = 0;
    for item in items.iter_mut() {
        let Some(query) = item.serverless_query() else {
            continue;
        };
        let post = gateway.resolve_post(&query).await?;
        map(item, &post);
        mapped += 1;
    }
    Ok(mapped)
}
