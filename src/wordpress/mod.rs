//! WordPress gateway module
//!
//! Turns preview queries into WordPress REST calls and shapes the JSON into
//! the post record the page template consumes.

mod digest;
mod gateway;
mod types;

pub use gateway::WordPressGateway;
pub use types::{PostRecord, PreviewQuery};
