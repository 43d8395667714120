//! Routing module
//!
//! Classifies inbound requests into protocol actions:
//! - `GET /download` reads a resource
//! - `PUT|POST /upload` writes a resource
//! - everything else is rejected

mod classifier;

pub use classifier::{
    classify, classify_action, Action, Classification, DOWNLOAD_PATH, MODE_HEADER,
    RESOURCE_HEADER, UPLOAD_PATH,
};
