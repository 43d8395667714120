// Server loop module
// Accepts connections until the shutdown signal fires, then drops the listener

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::error::ConnectionError;
use crate::logger;

/// Accept loop owned by a listening server
///
/// Returns once `shutdown` is notified. Connections already accepted keep
/// running in their own tasks.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        logger::log_connection_accepted(&peer_addr);
                        handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => state.observer.on_error(&ConnectionError::Accept(e)),
                }
            }

            () = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_server_stopped();
}
