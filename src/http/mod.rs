//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! transfer handlers: range parsing, response building, the tracked response
//! body and the response guard.

pub mod body;
pub mod guard;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::TransferBody;
pub use guard::{ResponseGuard, ResponseState};
pub use range::parse_range_header;
pub use response::{
    build_download_response, build_error_response, build_upload_response, http_date,
};
