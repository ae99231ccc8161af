// WordPress REST data shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `postid` / `postslug` query parameters of a preview request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewQuery {
    pub post_id: Option<String>,
    pub post_slug: Option<String>,
}

impl PreviewQuery {
    pub const POST_ID_PARAM: &'static str = "postid";
    pub const POST_SLUG_PARAM: &'static str = "postslug";

    /// Build from raw query values; blank values count as absent.
    pub fn new(post_id: Option<&str>, post_slug: Option<&str>) -> Self {
        let clean = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        Self {
            post_id: clean(post_id),
            post_slug: clean(post_slug),
        }
    }

    /// True when neither id nor slug was supplied
    pub const fn is_empty(&self) -> bool {
        self.post_id.is_none() && self.post_slug.is_none()
    }
}

/// `{ "rendered": "..." }` wrapper used by WordPress for HTML fields
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// Row of the digest listing (`_fields=title,modified,id,slug`)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PostSummary {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub modified: String,
}

/// Row of the tags endpoint (`_fields=id`)
#[derive(Debug, Clone, Deserialize)]
pub struct TagRow {
    pub id: u64,
}

/// Post JSON exactly as the CMS returned it.
///
/// The one guarantee: `content.rendered` is a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PostRecord(Value);

impl PostRecord {
    pub fn new(mut value: Value) -> Self {
        if let Value::Object(map) = &mut value {
            let content = map
                .entry("content")
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if !content.is_object() {
                *content = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(content) = content {
                if !content.get("rendered").is_some_and(Value::is_string) {
                    content.insert("rendered".to_string(), Value::String(String::new()));
                }
            }
        }
        Self(value)
    }

    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    fn str_at(&self, pointer: &str) -> &str {
        self.0.pointer(pointer).and_then(Value::as_str).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn id(&self) -> Option<u64> {
        self.0.get("id").and_then(Value::as_u64)
    }

    pub fn slug(&self) -> &str {
        self.str_at("/slug")
    }

    pub fn title(&self) -> &str {
        self.str_at("/title/rendered")
    }

    pub fn content(&self) -> &str {
        self.str_at("/content/rendered")
    }

    pub fn date(&self) -> &str {
        self.str_at("/date")
    }

    pub fn modified(&self) -> &str {
        self.str_at("/modified")
    }

    /// First embedded author name, if `_embed` was honored
    pub fn author_name(&self) -> &str {
        self.str_at("/_embedded/author/0/name")
    }

    /// First embedded featured media URL
    pub fn featured_image(&self) -> &str {
        self.str_at("/_embedded/wp:featuredmedia/0/source_url")
    }
}
