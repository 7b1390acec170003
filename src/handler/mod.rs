//! Request handler module
//!
//! Routes each request to the CORS preflight responder or the static file
//! resolver, then decorates the response for WebGL builds.

pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
