// Server lifecycle
// Readiness state machine around the accept loop

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::listener::create_reusable_listener;
use super::server_loop::start_server_loop;
use super::state::ServerState;
use crate::config::AppState;
use crate::error::ServerError;
use crate::logger;

struct Lifecycle {
    state: ServerState,
    shutdown: Option<Arc<Notify>>,
    task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl Lifecycle {
    fn transition(&mut self, to: ServerState) {
        logger::log_server_state(self.state, to);
        self.state = to;
    }

    fn require(&self, operation: &'static str, expected: ServerState) -> Result<(), ServerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ServerError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

/// Resource transfer server
///
/// Owns the store and observer (through [`AppState`]) and drives the
/// listener lifecycle. Operations called from the wrong state fail with
/// [`ServerError::InvalidState`] and change nothing.
pub struct Server {
    app: Arc<AppState>,
    lifecycle: Mutex<Lifecycle>,
}

impl Server {
    pub fn new(app: AppState) -> Self {
        let mut lifecycle = Lifecycle {
            state: ServerState::Init,
            shutdown: None,
            task: None,
            local_addr: None,
        };
        // Store and observer are wired by now
        lifecycle.transition(ServerState::Ready);

        Self {
            app: Arc::new(app),
            lifecycle: Mutex::new(lifecycle),
        }
    }

    pub fn state(&self) -> ServerState {
        self.lifecycle.lock().state
    }

    /// Address bound by the last successful [`listen`](Self::listen)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lifecycle.lock().local_addr
    }

    /// Bind `addr` and start accepting connections (`ready -> listening`)
    ///
    /// Must be called from within a tokio runtime. Returns the bound address,
    /// which differs from `addr` when port 0 was requested. A bind failure,
    /// or a call with no runtime, leaves the server `ready`.
    pub fn listen(&self, addr: SocketAddr) -> Result<SocketAddr, ServerError> {
        let mut lifecycle = self.lifecycle.lock();
        lifecycle.require("listen", ServerState::Ready)?;
        let runtime = Handle::try_current()
            .map_err(|_| ServerError::NoRuntime { operation: "listen" })?;

        let bind_err = |source| ServerError::Bind { addr, source };
        let listener = create_reusable_listener(addr, self.app.backlog).map_err(bind_err)?;
        let local_addr = listener.local_addr().map_err(bind_err)?;

        let shutdown = Arc::new(Notify::new());
        let task = runtime.spawn(start_server_loop(
            listener,
            Arc::clone(&self.app),
            Arc::clone(&shutdown),
        ));

        lifecycle.shutdown = Some(shutdown);
        lifecycle.task = Some(task);
        lifecycle.local_addr = Some(local_addr);
        lifecycle.transition(ServerState::Listening);
        Ok(local_addr)
    }

    /// Stop accepting connections (`listening -> closing -> closed`)
    ///
    /// Resolves once the accept loop has dropped the listener.
    pub async fn close(&self) -> Result<(), ServerError> {
        let (shutdown, task) = {
            let mut lifecycle = self.lifecycle.lock();
            lifecycle.require("close", ServerState::Listening)?;
            lifecycle.transition(ServerState::Closing);
            (lifecycle.shutdown.take(), lifecycle.task.take())
        };

        if let Some(shutdown) = shutdown {
            shutdown.notify_one();
        }
        if let Some(task) = task {
            if let Err(e) = task.await {
                logger::log_error(&format!("Accept loop ended abnormally: {e}"));
            }
        }

        self.lifecycle.lock().transition(ServerState::Closed);
        Ok(())
    }

    /// Make a closed server listenable again (`closed -> ready`)
    pub fn reset(&self) -> Result<(), ServerError> {
        let mut lifecycle = self.lifecycle.lock();
        lifecycle.require("reset", ServerState::Closed)?;
        lifecycle.local_addr = None;
        lifecycle.transition(ServerState::Ready);
        Ok(())
    }
}

impl Drop for Server {
    /// A server dropped while listening stops its accept loop and releases
    /// the socket.
    fn drop(&mut self) {
        let lifecycle = self.lifecycle.get_mut();
        if let Some(shutdown) = lifecycle.shutdown.take() {
            shutdown.notify_one();
        }
        if let Some(task) = lifecycle.task.take() {
            task.abort();
        }
    }
}
