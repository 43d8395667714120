//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: classification, resource
//! validation, mode defaulting, event emission and dispatch to the transfer
//! handlers. Every outcome is committed through a [`ResponseGuard`].

use std::sync::Arc;

use hyper::body::{Body, Bytes};
use hyper::header::RANGE;
use hyper::{HeaderMap, Request, Response};

use super::{download, upload};
use crate::config::AppState;
use crate::error::{BoxError, ResponseStateError, ServeError};
use crate::http::{build_error_response, ResponseGuard, TransferBody};
use crate::logger;
use crate::routing::{self, Action, Classification};
use crate::server::TransferEvent;

/// Main entry point for HTTP request handling
///
/// Returns `Err` only when the response guard rejects a write, in which case
/// hyper aborts the connection without sending anything further.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<TransferBody>, ResponseStateError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let classification = routing::classify(&parts.method, parts.uri.path(), &parts.headers);
    let mut guard = ResponseGuard::new();

    let committed = match dispatch(&classification, &parts.headers, body, &state).await {
        Ok(response) => guard.respond(response),
        Err(err) => {
            logger::log_request_failed(
                classification.resource.as_deref().unwrap_or("-"),
                err.status().as_u16(),
                err.message(),
            );
            guard.write_error(&err)
        }
    };
    if let Err(e) = committed {
        logger::log_error(&format!("Response invariant violated: {e}"));
        return Err(e);
    }

    Ok(guard
        .take_response()
        .unwrap_or_else(|| build_error_response(&ServeError::internal("no response produced"))))
}

/// Validate the classified request and run the matching transfer
async fn dispatch<B>(
    classification: &Classification,
    headers: &HeaderMap,
    body: B,
    state: &AppState,
) -> Result<Response<TransferBody>, ServeError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let Some(direction) = classification.action.direction() else {
        return Err(ServeError::not_found("not found"));
    };
    let resource = match classification.resource.as_deref() {
        Some(resource) if classification.is_resource_valid() => resource,
        _ => return Err(ServeError::bad_request("invalid resource")),
    };

    // The only place an absent mode is defaulted
    let mode = classification
        .mode
        .clone()
        .unwrap_or_else(|| direction.default_mode().as_str().to_owned());
    let event = TransferEvent {
        resource: resource.to_owned(),
        mode,
    };

    let store = state.store.as_ref();
    match classification.action {
        Action::Download => {
            state.observer.on_download(&event);
            let range = headers.get(RANGE).and_then(|v| v.to_str().ok());
            download::serve_download(store, &event, range).await
        }
        Action::Upload => {
            state.observer.on_upload(&event);
            upload::serve_upload(store, &event, body).await
        }
        Action::Invalid => Err(ServeError::not_found("not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::server::TransferObserver;
    use crate::store::{FileStore, MemoryStore, ResourceStore};
    use futures_util::stream;
    use http_body_util::{BodyExt, Full, StreamBody};
    use hyper::body::Frame;
    use hyper::header::{CONTENT_LENGTH, CONTENT_RANGE, LAST_MODIFIED};
    use hyper::{Method, StatusCode};
    use parking_lot::Mutex;
    use std::io;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(&'static str, TransferEvent)>>,
    }

    impl TransferObserver for Recorder {
        fn on_download(&self, event: &TransferEvent) {
            self.events.lock().push(("download", event.clone()));
        }

        fn on_upload(&self, event: &TransferEvent) {
            self.events.lock().push(("upload", event.clone()));
        }
    }

    fn app(store: Arc<dyn ResourceStore>) -> (Arc<AppState>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn TransferObserver> = recorder.clone();
        (Arc::new(AppState::new(store, observer)), recorder)
    }

    fn request(
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
        body: &'static [u8],
    ) -> Request<Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Full::new(Bytes::from_static(body))).unwrap()
    }

    async fn send(
        state: &Arc<AppState>,
        req: Request<Full<Bytes>>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let response = handle_request(req, Arc::clone(state)).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();
        (parts.status, parts.headers, bytes)
    }

    #[tokio::test]
    async fn test_download_stored_bytes() {
        let store = MemoryStore::new(0);
        store.insert("/a/b.json", "0123456789").unwrap();
        let (state, recorder) = app(Arc::new(store));

        let req = request(Method::GET, "/download", &[("x-resource", "/a/b.json")], b"");
        let (status, headers, body) = send(&state, req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "10");
        assert!(headers.contains_key(LAST_MODIFIED));
        assert_eq!(&body[..], b"0123456789");

        let events = recorder.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "download");
        assert_eq!(events[0].1.resource, "/a/b.json");
        assert_eq!(events[0].1.mode, "r");
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_404() {
        let (state, recorder) = app(Arc::new(MemoryStore::new(0)));

        for (method, path) in [
            (Method::GET, "/"),
            (Method::DELETE, "/download"),
            (Method::GET, "/upload"),
            (Method::PUT, "/download"),
        ] {
            let req = request(method, path, &[("x-resource", "/a")], b"");
            let (status, _, body) = send(&state, req).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(&body[..], b"not found");
        }
        assert!(recorder.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_resource_is_400() {
        let (state, recorder) = app(Arc::new(MemoryStore::new(0)));

        let cases: [&[(&str, &str)]; 2] = [&[("x-resource", "a/b")], &[]];
        for headers in cases {
            let req = request(Method::PUT, "/upload", headers, b"data");
            let (status, headers, body) = send(&state, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(headers["connection"], "close");
            assert_eq!(&body[..], b"invalid resource");
        }
        assert!(recorder.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_upload_then_download() {
        let store = MemoryStore::new(0);
        let (state, recorder) = app(Arc::new(store.clone()));

        let req = request(Method::PUT, "/upload", &[("x-resource", "/doc")], b"payload");
        let (status, _, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(store.get("/doc").unwrap(), b"payload");

        let req = request(Method::GET, "/download", &[("x-resource", "/doc")], b"");
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "7");
        assert_eq!(&body[..], b"payload");

        let events = recorder.events.lock();
        assert_eq!(events[0].0, "upload");
        assert_eq!(events[0].1.mode, "w");
    }

    #[tokio::test]
    async fn test_append_accumulates_write_replaces() {
        let store = MemoryStore::new(0);
        let (state, _) = app(Arc::new(store.clone()));

        for (mode, data) in [("w", &b"one"[..]), ("a", b"two"), ("append", b"three")] {
            let req = request(
                Method::POST,
                "/upload",
                &[("x-resource", "/log"), ("x-mode", mode)],
                data,
            );
            assert_eq!(send(&state, req).await.0, StatusCode::OK);
        }
        assert_eq!(store.get("/log").unwrap(), b"onetwothree");

        let req = request(
            Method::PUT,
            "/upload",
            &[("x-resource", "/log"), ("x-mode", "write")],
            b"fresh",
        );
        assert_eq!(send(&state, req).await.0, StatusCode::OK);
        assert_eq!(store.get("/log").unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_mode_direction_mismatch() {
        let store = MemoryStore::new(0);
        store.insert("/x", "abc").unwrap();
        let (state, recorder) = app(Arc::new(store));

        let req = request(Method::GET, "/download", &[("x-resource", "/x"), ("x-mode", "w")], b"");
        assert_eq!(send(&state, req).await.0, StatusCode::BAD_REQUEST);

        let req = request(Method::PUT, "/upload", &[("x-resource", "/x"), ("x-mode", "r")], b"z");
        assert_eq!(send(&state, req).await.0, StatusCode::BAD_REQUEST);

        // Unknown modes are rejected after the event fired
        let req = request(Method::GET, "/download", &[("x-resource", "/x"), ("x-mode", "rw")], b"");
        let (status, _, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(&body[..], b"unsupported mode: rw");
        assert_eq!(recorder.events.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_upload_failing_mid_body_keeps_prefix() {
        let store = MemoryStore::new(0);
        let (state, _) = app(Arc::new(store.clone()));

        let frames: Vec<Result<Frame<Bytes>, io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"part"))),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/upload")
            .header("x-resource", "/partial")
            .body(StreamBody::new(stream::iter(frames)))
            .unwrap();

        let response = handle_request(req, Arc::clone(&state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.get("/partial").unwrap(), b"part");
    }

    #[tokio::test]
    async fn test_missing_resource_is_404() {
        let (state, _) = app(Arc::new(MemoryStore::new(0)));
        let req = request(Method::GET, "/download", &[("x-resource", "/nope")], b"");
        assert_eq!(send(&state, req).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_range_requests() {
        let store = MemoryStore::new(0);
        store.insert("/r", "0123456789").unwrap();
        let (state, _) = app(Arc::new(store));

        let req = request(
            Method::GET,
            "/download",
            &[("x-resource", "/r"), ("range", "bytes=2-4")],
            b"",
        );
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers[CONTENT_RANGE], "bytes 2-4/10");
        assert_eq!(headers[CONTENT_LENGTH], "3");
        assert_eq!(&body[..], b"234");

        let req = request(
            Method::GET,
            "/download",
            &[("x-resource", "/r"), ("range", "bytes=20-")],
            b"",
        );
        let (status, headers, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(headers[CONTENT_RANGE], "bytes */10");

        // Malformed ranges fall back to the whole resource
        let req = request(
            Method::GET,
            "/download",
            &[("x-resource", "/r"), ("range", "bytes=x-y")],
            b"",
        );
        let (status, _, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.len(), 10);
    }

    #[tokio::test]
    async fn test_depth_limit_and_traversal() {
        let (state, _) = app(Arc::new(MemoryStore::new(2)));

        let req = request(Method::PUT, "/upload", &[("x-resource", "/a/b")], b"ok");
        assert_eq!(send(&state, req).await.0, StatusCode::OK);

        let req = request(Method::PUT, "/upload", &[("x-resource", "/a/b/c")], b"deep");
        assert_eq!(send(&state, req).await.0, StatusCode::BAD_REQUEST);

        let req = request(Method::GET, "/download", &[("x-resource", "/../etc")], b"");
        assert_eq!(send(&state, req).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            root: dir.path().to_path_buf(),
            max_depth: 0,
            require_root: true,
            create_root: false,
        };
        let (state, _) = app(Arc::new(FileStore::new(&config).await.unwrap()));

        let req = request(
            Method::PUT,
            "/upload",
            &[("x-resource", "/nested/dir/file.txt")],
            b"on disk",
        );
        assert_eq!(send(&state, req).await.0, StatusCode::OK);
        let on_disk = std::fs::read(dir.path().join("nested/dir/file.txt")).unwrap();
        assert_eq!(on_disk, b"on disk");

        let req = request(
            Method::GET,
            "/download",
            &[("x-resource", "/nested/dir/file.txt")],
            b"",
        );
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "7");
        assert_eq!(&body[..], b"on disk");
    }
}
