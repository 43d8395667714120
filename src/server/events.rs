// Transfer events
// Observer seam notified of transfers and connection failures

use crate::error::ConnectionError;
use crate::logger;

/// A classified, resource-valid transfer request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub resource: String,
    /// Mode as requested (or defaulted), before it is parsed
    pub mode: String,
}

/// Receives server events
///
/// Registered once at construction and shared by every connection.
/// Download and upload events fire before the store is touched; errors fire
/// for accept failures and connections hyper could not serve.
pub trait TransferObserver: Send + Sync {
    fn on_download(&self, _event: &TransferEvent) {}

    fn on_upload(&self, _event: &TransferEvent) {}

    fn on_error(&self, _error: &ConnectionError) {}
}

/// Default observer writing events to the log
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    access_log: bool,
}

impl LogObserver {
    pub const fn new(access_log: bool) -> Self {
        Self { access_log }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TransferObserver for LogObserver {
    fn on_download(&self, event: &TransferEvent) {
        if self.access_log {
            logger::log_transfer("download", &event.resource, &event.mode);
        }
    }

    fn on_upload(&self, event: &TransferEvent) {
        if self.access_log {
            logger::log_transfer("upload", &event.resource, &event.mode);
        }
    }

    fn on_error(&self, error: &ConnectionError) {
        logger::log_connection_error(error);
    }
}
