//! Routing module
//!
//! Decides, per inbound request, between rendering a single post, rendering
//! the digest, or handing the request to the live site:
//! - `decision`: pure classification from path and query
//! - `outcome`: completes the decision with a CMS slug probe

mod decision;
mod outcome;

pub use outcome::{route, Outcome};
