//! HTTP protocol layer module
//!
//! Header decoration rules, MIME detection, cache validation and response
//! builders, decoupled from filesystem access.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use headers::{apply_cors, headers_for};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_file_response,
    build_html_response, build_moved_permanently, build_options_response,
};
