//! Error types
//!
//! [`ServeError`] is the typed error that terminates a request: it carries the
//! HTTP status, the plain-text message sent to the client, extra response
//! headers, and optionally the lower-level error it was created from.
//! The remaining types describe failures that never reach a client.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};

use crate::server::ServerState;

/// Boxed error used as the diagnostic source of a [`ServeError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message used when an untyped failure is wrapped into a 404
const WRAPPED_MESSAGE: &str = "resource not found";

/// Typed request error, rendered as a terminal plain-text HTTP response
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ServeError {
    status: StatusCode,
    message: String,
    headers: HeaderMap,
    #[source]
    source: Option<BoxError>,
}

impl ServeError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            headers: HeaderMap::new(),
            source: None,
        }
    }

    /// 400: malformed resource, unsupported mode, depth exceeded
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404: unknown endpoint, missing resource, I/O failure
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 416 with a `Content-Range: bytes */<size>` header
    pub fn range_not_satisfiable(size: u64) -> Self {
        Self::new(StatusCode::RANGE_NOT_SATISFIABLE, "range not satisfiable")
            .with_header(
                hyper::header::CONTENT_RANGE,
                HeaderValue::from_str(&format!("bytes */{size}"))
                    .unwrap_or_else(|_| HeaderValue::from_static("bytes */*")),
            )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Wrap an untyped failure into a 404, keeping it as the source.
    pub fn wrap(err: impl Into<BoxError>) -> Self {
        let mut wrapped = Self::not_found(WRAPPED_MESSAGE);
        wrapped.source = Some(err.into());
        wrapped
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether this error was created by wrapping a lower-level failure
    pub const fn is_wrapped(&self) -> bool {
        self.source.is_some()
    }
}

impl From<io::Error> for ServeError {
    fn from(err: io::Error) -> Self {
        Self::wrap(err)
    }
}

/// Invariant violation on the response guard
///
/// Raised when an error is written to a response that can no longer carry
/// one. Never sent to the client: the connection is aborted instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResponseStateError {
    #[error("response is already finished")]
    Finished,
    #[error("response head has already been sent")]
    HeadersSent,
}

/// Server lifecycle failures
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("cannot {operation} while server is {state}")]
    InvalidState {
        operation: &'static str,
        state: ServerState,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("cannot {operation} outside a tokio runtime")]
    NoRuntime { operation: &'static str },
}

/// Connection-level failure reported to the transfer observer
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),
    #[error("failed to serve connection from {peer}: {source}")]
    Serve {
        peer: SocketAddr,
        #[source]
        source: hyper::Error,
    },
}

/// Failures constructing a filesystem store
#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    #[error("store root must be an absolute path: {0}")]
    RootNotAbsolute(PathBuf),
    #[error("store root does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("store root is not a directory: {0}")]
    RootNotDirectory(PathBuf),
    #[error("store root inaccessible: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_constructors_status() {
        assert_eq!(ServeError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServeError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServeError::internal("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServeError::range_not_satisfiable(10).status(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
    }

    #[test]
    fn test_range_error_carries_content_range() {
        let err = ServeError::range_not_satisfiable(42);
        assert_eq!(
            err.headers().get(hyper::header::CONTENT_RANGE).unwrap(),
            "bytes */42"
        );
    }

    #[test]
    fn test_io_error_wrapped_as_not_found() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ServeError::from(io_err);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.is_wrapped());
        assert_eq!(err.source().unwrap().to_string(), "denied");
    }

    #[test]
    fn test_native_error_has_no_source() {
        let err = ServeError::bad_request("invalid resource");
        assert!(!err.is_wrapped());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "invalid resource");
    }

    #[test]
    fn test_invalid_state_message() {
        let err = ServerError::InvalidState {
            operation: "close",
            state: ServerState::Ready,
        };
        assert_eq!(err.to_string(), "cannot close while server is ready");
    }
}
