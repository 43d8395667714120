//! Request handler module
//!
//! Responsible for request dispatch and the two transfer operations:
//! streaming a resource out (download) and a request body in (upload).

pub mod download;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
