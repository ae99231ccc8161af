//! Request handler module
//!
//! Adapts HTTP requests into function invocations, dispatches them through
//! the preview router and writes the result back.

pub mod invocation;
pub mod proxy;
pub mod router;

pub use invocation::FunctionRequest;
pub use router::handle_request;
