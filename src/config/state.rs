// Application state module
// Immutable per-server state shared by every request

use std::sync::Arc;

use crate::server::TransferObserver;
use crate::store::ResourceStore;

/// Application state
///
/// Built once per server and shared across connections behind an `Arc`.
/// Nothing in here changes after construction, so requests never lock it.
pub struct AppState {
    pub store: Arc<dyn ResourceStore>,
    pub observer: Arc<dyn TransferObserver>,
    pub keep_alive: bool,
    pub backlog: i32,
}

impl AppState {
    pub fn new(store: Arc<dyn ResourceStore>, observer: Arc<dyn TransferObserver>) -> Self {
        Self {
            store,
            observer,
            keep_alive: true,
            backlog: 128,
        }
    }

    /// Apply the performance section of the configuration
    #[must_use]
    pub fn with_performance(mut self, keep_alive: bool, backlog: i32) -> Self {
        self.keep_alive = keep_alive;
        self.backlog = backlog;
        self
    }
}
