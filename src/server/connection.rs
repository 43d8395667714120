// Connection handling module
// Serves one accepted TCP connection with hyper's HTTP/1.1 implementation

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use crate::config::AppState;
use crate::error::ConnectionError;
use crate::handler;

/// Handle a single connection in a spawned task.
///
/// Requests on the connection are handled one after another (HTTP/1.1
/// keep-alive when enabled). A connection hyper fails to serve, including one
/// aborted by a response invariant violation, is reported to the observer.
pub fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { handler::handle_request(req, state).await }
            }),
        );

        if let Err(source) = conn.await {
            state.observer.on_error(&ConnectionError::Serve {
                peer: peer_addr,
                source,
            });
        }
    });
}
