// Digest page construction
// Synthesizes a post-shaped record that lists every previewable post

use serde_json::{json, Value};

use super::types::{PostRecord, PostSummary, PreviewQuery};

/// Content used when the listing is empty
pub const EMPTY_DIGEST_CONTENT: &str = "No content to preview";

/// Static post-shaped template for the digest page.
///
/// Never mutated; every digest is built from a fresh clone.
#[derive(Debug, Clone)]
pub struct DigestTemplate {
    value: Value,
}

impl Default for DigestTemplate {
    fn default() -> Self {
        Self {
            value: json!({
                "id": 0,
                "slug": "preview-digest",
                "status": "draft",
                "type": "post",
                "link": "",
                "date": "1970-01-01T00:00:00",
                "date_gmt": "1970-01-01T00:00:00",
                "modified": "1970-01-01T00:00:00",
                "modified_gmt": "1970-01-01T00:00:00",
                "title": { "rendered": "Preview Mode" },
                "content": { "rendered": "" },
                "excerpt": { "rendered": "" },
                "author": 0,
                "categories": [],
                "tags": [],
                "meta": []
            }),
        }
    }
}

impl DigestTemplate {
    /// Build the digest record for `posts`, in the order given.
    pub fn build(&self, posts: &[PostSummary]) -> PostRecord {
        let mut value = self.value.clone();

        let content = if posts.is_empty() {
            EMPTY_DIGEST_CONTENT.to_string()
        } else {
            let items: String = posts.iter().map(list_item).collect();
            format!("<ul>{items}</ul>")
        };
        value["content"] = json!({ "rendered": content });

        if let Some(first) = posts.first() {
            value["date"] = Value::String(first.modified.clone());
            value["modified"] = Value::String(first.modified.clone());
        }

        PostRecord::new(value)
    }
}

fn list_item(post: &PostSummary) -> String {
    format!(
        "<li><a href=\"?{}={}&{}={}\">{}</a> - {}</li>",
        PreviewQuery::POST_ID_PARAM,
        post.id,
        PreviewQuery::POST_SLUG_PARAM,
        post.slug,
        post.title.rendered,
        post.modified
    )
}
