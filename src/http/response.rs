//! HTTP response building module
//!
//! Builders for the few responses the transfer protocol produces, decoupled
//! from the request handling that decides which one to send.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, CONNECTION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};

use super::body::TransferBody;
use crate::error::ServeError;
use crate::store::ResourceMetadata;

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate)
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Build the terminal plain-text response for a request error
///
/// The connection is closed afterwards: a request body the handler did not
/// consume must not be parsed as the next request.
pub fn build_error_response(err: &ServeError) -> Response<TransferBody> {
    let body = Bytes::from(err.message().to_owned());
    let mut builder = Response::builder()
        .status(err.status())
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, body.len())
        .header(CONNECTION, "close");

    for (name, value) in err.headers() {
        builder = builder.header(name, value);
    }

    builder
        .body(TransferBody::from_bytes(body))
        .unwrap_or_else(|e| {
            log_build_error(err.status().as_str(), &e);
            plain_response(err.status())
        })
}

/// Build a 200 (or 206 when ranged) response streaming a resource
///
/// `start..end` is the byte span actually being sent, `end` exclusive.
pub fn build_download_response(
    metadata: &ResourceMetadata,
    start: u64,
    end: u64,
    ranged: bool,
    body: TransferBody,
) -> Response<TransferBody> {
    let partial = ranged && end > start;
    let status = if partial {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, end - start)
        .header(ACCEPT_RANGES, "bytes");

    if let Some(modified) = metadata.modified {
        builder = builder.header(LAST_MODIFIED, http_date(modified));
    }
    if partial {
        builder = builder.header(
            CONTENT_RANGE,
            format!("bytes {start}-{}/{}", end - 1, metadata.size),
        );
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        plain_response(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Build the empty 200 acknowledging a completed upload
pub fn build_upload_response() -> Response<TransferBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_LENGTH, 0)
        .body(TransferBody::empty())
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            plain_response(StatusCode::OK)
        })
}

fn plain_response(status: StatusCode) -> Response<TransferBody> {
    let mut response = Response::new(TransferBody::empty());
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::time::Duration;

    #[test]
    fn test_http_date() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = build_error_response(&ServeError::bad_request("invalid resource"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[CONTENT_LENGTH], "16");
        assert_eq!(response.headers()[CONNECTION], "close");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"invalid resource");
    }

    #[test]
    fn test_error_response_carries_error_headers() {
        let response = build_error_response(&ServeError::range_not_satisfiable(42));
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */42");
    }

    #[test]
    fn test_download_full() {
        let meta = ResourceMetadata {
            size: 10,
            modified: Some(SystemTime::UNIX_EPOCH),
        };
        let response = build_download_response(&meta, 0, 10, false, TransferBody::empty());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "10");
        assert_eq!(
            response.headers()[LAST_MODIFIED],
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
        assert!(response.headers().get(CONTENT_RANGE).is_none());
    }

    #[test]
    fn test_download_partial() {
        let meta = ResourceMetadata {
            size: 100,
            modified: None,
        };
        let response = build_download_response(&meta, 10, 20, true, TransferBody::empty());
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_LENGTH], "10");
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 10-19/100");
        assert!(response.headers().get(LAST_MODIFIED).is_none());
    }

    #[test]
    fn test_upload_response() {
        let response = build_upload_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
    }
}
