// Server module entry
// Lifecycle state machine, accept loop, connection handling and signals

mod connection;
pub mod events;
mod lifecycle;
pub mod listener;
pub mod signal;
mod state;

// `loop` is a keyword, so the module file is mapped to server_loop
#[path = "loop.rs"]
mod server_loop;

// Re-export commonly used types
pub use events::{LogObserver, TransferEvent, TransferObserver};
pub use lifecycle::Server;
pub use listener::create_reusable_listener;
pub use state::ServerState;
