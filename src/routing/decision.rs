//! Pure routing decision
//!
//! Classifies an invocation using only its original URL and query, with no
//! I/O, so every branch is testable in isolation.

use crate::handler::FunctionRequest;
use crate::wordpress::PreviewQuery;

/// What the request looks like before any CMS lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `postid` or `postslug` given: render that post
    Single(PreviewQuery),
    /// Root path or no original URL: render the digest
    Digest,
    /// First path segment could be a post slug
    SlugCandidate { slug: String, path: String },
    /// Anything else goes to the live site
    Passthrough { path: String },
}

/// Decide how to serve `request`. Most specific match wins.
pub fn decide(request: &FunctionRequest) -> Decision {
    let query = request.preview_query();
    if !query.is_empty() {
        return Decision::Single(query);
    }

    let Some(original) = request.original_url() else {
        return Decision::Digest;
    };
    if normalized_path(original) == "/" {
        return Decision::Digest;
    }

    let segment = first_segment(original);
    if is_slug_candidate(segment) {
        Decision::SlugCandidate {
            slug: segment.to_string(),
            path: original.to_string(),
        }
    } else {
        Decision::Passthrough {
            path: original.to_string(),
        }
    }
}

/// Path without query string or fragment; empty becomes `/`
pub fn normalized_path(original: &str) -> &str {
    let end = original.find(['?', '#']).unwrap_or(original.len());
    let path = &original[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// First path segment: leading slash stripped, stops at `/`, `?` or `#`
pub fn first_segment(original: &str) -> &str {
    let path = normalized_path(original);
    let path = path.strip_prefix('/').unwrap_or(path);
    path.split('/').next().unwrap_or_default()
}

/// Non-empty and made only of `[A-Za-z0-9|-]`
pub fn is_slug_candidate(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '|' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(original: Option<&str>, query: &[(&str, &str)]) -> FunctionRequest {
        FunctionRequest::new(original.map(String::from), query)
    }

    #[test]
    fn test_postid_wins_regardless_of_path() {
        for path in [None, Some("/"), Some("/styles.css"), Some("/some-post/deep")] {
            let req = request(path, &[("postid", "42"), ("other", "x")]);
            assert_eq!(
                decide(&req),
                Decision::Single(PreviewQuery::new(Some("42"), None))
            );
        }
    }

    #[test]
    fn test_postslug_alone_renders_single() {
        let req = request(Some("/whatever.png"), &[("postslug", "hello")]);
        assert_eq!(
            decide(&req),
            Decision::Single(PreviewQuery::new(None, Some("hello")))
        );
    }

    #[test]
    fn test_root_and_missing_header_render_digest() {
        assert_eq!(decide(&request(Some("/"), &[])), Decision::Digest);
        assert_eq!(decide(&request(Some("/?utm=1"), &[])), Decision::Digest);
        assert_eq!(decide(&request(Some(""), &[])), Decision::Digest);
        assert_eq!(decide(&request(None, &[])), Decision::Digest);
    }

    #[test]
    fn test_blank_postid_is_ignored() {
        assert_eq!(decide(&request(Some("/"), &[("postid", "")])), Decision::Digest);
    }

    #[test]
    fn test_slug_candidate() {
        assert_eq!(
            decide(&request(Some("/my-post?ref=x"), &[])),
            Decision::SlugCandidate {
                slug: "my-post".to_string(),
                path: "/my-post?ref=x".to_string()
            }
        );
        assert_eq!(
            decide(&request(Some("/News-2024/page/2"), &[])),
            Decision::SlugCandidate {
                slug: "News-2024".to_string(),
                path: "/News-2024/page/2".to_string()
            }
        );
    }

    #[test]
    fn test_non_slug_characters_pass_through() {
        for path in ["/styles.css", "/wp_content/x", "/caf%C3%A9", "/a+b", "//double"] {
            assert_eq!(
                decide(&request(Some(path), &[])),
                Decision::Passthrough {
                    path: path.to_string()
                },
                "path {path}"
            );
        }
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("/a/b/c"), "a");
        assert_eq!(first_segment("/a?x=/y"), "a");
        assert_eq!(first_segment("/"), "");
        assert_eq!(first_segment("plain"), "plain");
    }

    #[test]
    fn test_is_slug_candidate() {
        assert!(is_slug_candidate("hello-world"));
        assert!(is_slug_candidate("a|b"));
        assert!(is_slug_candidate("ABC123"));
        assert!(!is_slug_candidate(""));
        assert!(!is_slug_candidate("file.js"));
        assert!(!is_slug_candidate("under_score"));
    }
}
