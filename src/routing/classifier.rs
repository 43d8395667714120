//! Request classification
//!
//! Decides what a request asks for from its method, path and the two
//! protocol headers. No I/O happens here and nothing is defaulted: an absent
//! `X-Mode` stays `None` for the handler to resolve.

use hyper::{HeaderMap, Method};

use crate::store::Direction;

/// Fixed download endpoint
pub const DOWNLOAD_PATH: &str = "/download";
/// Fixed upload endpoint
pub const UPLOAD_PATH: &str = "/upload";

/// Header naming the resource
pub const RESOURCE_HEADER: &str = "x-resource";
/// Header carrying the access mode
pub const MODE_HEADER: &str = "x-mode";

/// What a request asks the server to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Download,
    Upload,
    Invalid,
}

impl Action {
    /// Store direction for the action, `None` for [`Action::Invalid`]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Download => Some(Direction::Read),
            Self::Upload => Some(Direction::Write),
            Self::Invalid => None,
        }
    }
}

/// Result of classifying a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub action: Action,
    pub resource: Option<String>,
    pub mode: Option<String>,
}

impl Classification {
    /// The resource header is present and starts with `/`
    pub fn is_resource_valid(&self) -> bool {
        self.resource.as_deref().is_some_and(|r| r.starts_with('/'))
    }
}

/// Map method and path onto an action
pub fn classify_action(method: &Method, path: &str) -> Action {
    match (method, path) {
        (&Method::GET, DOWNLOAD_PATH) => Action::Download,
        (&Method::PUT | &Method::POST, UPLOAD_PATH) => Action::Upload,
        _ => Action::Invalid,
    }
}

/// Classify a request and extract its protocol headers
pub fn classify(method: &Method, path: &str, headers: &HeaderMap) -> Classification {
    Classification {
        action: classify_action(method, path),
        resource: header_str(headers, RESOURCE_HEADER),
        mode: header_str(headers, MODE_HEADER),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
