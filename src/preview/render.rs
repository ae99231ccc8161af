//! Single-page renderer
//!
//! Resolves the post for a preview query and renders it into the page
//! template. Placeholders are `{{name}}`; unknown names are left verbatim and
//! substituted values are never rescanned.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PreviewError;
use crate::wordpress::{PostRecord, PreviewQuery, WordPressGateway};

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex">
    <title>{{title}}</title>
</head>
<body>
<main>
    <h1>{{title}}</h1>
    <p class="meta">{{author}} {{modified}}</p>
    {{content}}
</main>
</body>
</html>"#;

/// Renders the preview page for a query
#[async_trait]
pub trait SinglePageRenderer: Send + Sync {
    async fn render(&self, query: &PreviewQuery) -> Result<String, PreviewError>;
}

/// HTML page template with `{{placeholder}}` slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    source: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PageTemplate {
    pub fn new(source: String) -> Self {
        Self { source }
    }

    /// Load a template file at startup
    pub fn load(path: &Path) -> Result<Self, PreviewError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| PreviewError::Template(format!("{}: {e}", path.display())))?;
        if !source.contains("{{content}}") {
            return Err(PreviewError::Template(format!(
                "{} has no {{{{content}}}} placeholder",
                path.display()
            )));
        }
        Ok(Self::new(source))
    }

    pub fn render(&self, post: &PostRecord) -> String {
        let mut out = String::with_capacity(self.source.len() + post.content().len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            let name = after[..end].trim();
            match field(post, name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

fn field<'a>(post: &'a PostRecord, name: &str) -> Option<&'a str> {
    match name {
        "title" => Some(post.title()),
        "content" => Some(post.content()),
        "date" => Some(post.date()),
        "modified" => Some(post.modified()),
        "slug" => Some(post.slug()),
        "author" => Some(post.author_name()),
        "featured_image" => Some(post.featured_image()),
        _ => None,
    }
}

/// The preview page: gateway lookup plus template
pub struct PreviewPage {
    gateway: Arc<WordPressGateway>,
    template: PageTemplate,
}

impl PreviewPage {
    pub const fn new(gateway: Arc<WordPressGateway>, template: PageTemplate) -> Self {
        Self { gateway, template }
    }
}

#[async_trait]
impl SinglePageRenderer for PreviewPage {
    async fn render(&self, query: &PreviewQuery) -> Result<String, PreviewError> {
        let post = self.gateway.resolve_post(query).await?;
        Ok(self.template.render(&post))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreviewSettings;
    use crate::fetch::testing::FakeFetcher;
    use serde_json::json;

    fn post() -> PostRecord {
        PostRecord::new(json!({
            "slug": "hello",
            "title": {"rendered": "Hello"},
            "content": {"rendered": "<p>{{title}}</p>"},
            "date": "2024-01-01T00:00:00",
            "modified": "2024-01-02T00:00:00"
        }))
    }

    #[test]
    fn test_placeholders_substituted_once() {
        let template =
            PageTemplate::new("<h1>{{ title }}</h1>{{content}}<i>{{unknown}}</i>".to_string());
        assert_eq!(
            template.render(&post()),
            "<h1>Hello</h1><p>{{title}}</p><i>{{unknown}}</i>"
        );
    }

    #[test]
    fn test_unterminated_placeholder_kept() {
        let template = PageTemplate::new("{{slug}} and {{oops".to_string());
        assert_eq!(template.render(&post()), "hello and {{oops");
    }

    #[test]
    fn test_default_template_renders_content() {
        let html = PageTemplate::default().render(&post());
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("<p>{{title}}</p>"));
        assert!(html.contains("2024-01-02T00:00:00"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PageTemplate::load(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(matches!(err, PreviewError::Template(_)));
    }

    #[tokio::test]
    async fn test_preview_page_renders_post() {
        let fetcher = Arc::new(FakeFetcher::new().json(
            "https://cms.example/wp-json/wp/v2/posts/42?_embed",
            &json!({"id": 42, "title": {"rendered": "Draft"}, "content": {"rendered": "<p>body</p>"}}),
        ));
        let gateway = Arc::new(WordPressGateway::new(
            Arc::new(PreviewSettings::for_cms("https://cms.example")),
            fetcher,
        ));
        let template = PageTemplate::new("{{title}}|{{content}}".to_string());
        let page = PreviewPage::new(gateway, template);
        let html = page.render(&PreviewQuery::new(Some("42"), None)).await.unwrap();
        assert_eq!(html, "Draft|<p>body</p>");
    }
}
