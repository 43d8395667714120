//! Response guard
//!
//! Wraps the response of one request and enforces that an error can only be
//! written while nothing has been sent yet. The guard is `Open` until the
//! response body has been transmitted (or an error response was written), then
//! `Finished`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hyper::{Response, StatusCode};

use super::body::TransferBody;
use super::response::build_error_response;
use crate::error::{ResponseStateError, ServeError};

/// Lifecycle of a guarded response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    Open,
    Finished,
}

/// Per-request response wrapper
pub struct ResponseGuard {
    status: StatusCode,
    headers_sent: bool,
    finished: Arc<AtomicBool>,
    response: Option<Response<TransferBody>>,
}

impl Default for ResponseGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseGuard {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers_sent: false,
            finished: Arc::new(AtomicBool::new(false)),
            response: None,
        }
    }

    pub fn state(&self) -> ResponseState {
        if self.finished.load(Ordering::Acquire) {
            ResponseState::Finished
        } else {
            ResponseState::Open
        }
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Commit a success response; its head counts as sent from here on
    pub fn respond(&mut self, response: Response<TransferBody>) -> Result<(), ResponseStateError> {
        self.ensure_writable()?;
        let (parts, mut body) = response.into_parts();
        body.watch(Arc::clone(&self.finished));
        self.status = parts.status;
        self.headers_sent = true;
        self.response = Some(Response::from_parts(parts, body));
        Ok(())
    }

    /// Write `err` as the complete terminal response
    ///
    /// Fails with [`ResponseStateError`] once the response is finished or its
    /// head has been committed; the caller must abort the connection then.
    pub fn write_error(&mut self, err: &ServeError) -> Result<(), ResponseStateError> {
        self.ensure_writable()?;
        self.status = err.status();
        self.headers_sent = true;
        self.response = Some(build_error_response(err));
        self.finished.store(true, Ordering::Release);
        Ok(())
    }

    /// Hand the committed response over to the transport
    pub fn take_response(&mut self) -> Option<Response<TransferBody>> {
        self.response.take()
    }

    fn ensure_writable(&self) -> Result<(), ResponseStateError> {
        if self.state() == ResponseState::Finished {
            Err(ResponseStateError::Finished)
        } else if self.headers_sent {
            Err(ResponseStateError::HeadersSent)
        } else {
            Ok(())
        }
    }
}
