//! Companion live-site passthrough
//!
//! Requests that are not preview content are either fetched from the live
//! site and streamed back byte for byte, or redirected there.

use std::path::Path;

use super::invocation::FunctionResponse;
use crate::error::PreviewError;
use crate::fetch::Fetch;
use crate::http::mime;

/// `{live_base}{path}`, inserting the slash the path may lack
pub fn live_url(live_base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{live_base}{path}")
    } else {
        format!("{live_base}/{path}")
    }
}

/// Fetch `path` from the live site; content type and body pass through.
pub async fn fetch_resource(
    fetcher: &dyn Fetch,
    live_base: &str,
    path: &str,
) -> Result<FunctionResponse, PreviewError> {
    let url = live_url(live_base, path);
    let upstream = fetcher.get(&url).await?.error_for_status()?;
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| guess_content_type(path).to_string());
    Ok(FunctionResponse::raw(content_type, upstream.body))
}

/// 301 to the same path on the live site
pub fn redirect_resource(live_base: &str, path: &str) -> FunctionResponse {
    FunctionResponse::redirect(live_url(live_base, path))
}

fn guess_content_type(path: &str) -> &'static str {
    let path_only = path.split(['?', '#']).next().unwrap_or_default();
    mime::get_content_type(Path::new(path_only).extension().and_then(|e| e.to_str()))
}
