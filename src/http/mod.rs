//! HTTP protocol layer module
//!
//! Response builders and MIME lookup shared by the handler and the proxy.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_405_response, build_health_response, build_options_response, build_response,
};
