//! Resource store module
//!
//! A store turns a logical resource path and an access mode into a byte
//! stream. [`ResourceStore`] is the seam the server talks to; [`FileStore`]
//! backs it with a directory tree and [`MemoryStore`] with an in-process map.

pub mod fs;
pub mod memory;
pub mod mode;
pub mod path;

use std::pin::Pin;
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::ServeError;

pub use fs::FileStore;
pub use memory::MemoryStore;
pub use mode::{Direction, Mode};

/// Byte stream produced by [`ResourceStore::open_for_read`]
pub type ReadStream = Pin<Box<dyn AsyncRead + Send>>;

/// Byte sink produced by [`ResourceStore::open_for_write`]
pub type WriteStream = Pin<Box<dyn AsyncWrite + Send>>;

/// Size and modification time of a resource, read together with its existence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceMetadata {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Optional byte range for reads, `end` exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOptions {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl TransferOptions {
    pub const fn range(start: Option<u64>, end: Option<u64>) -> Self {
        Self { start, end }
    }

    pub const fn is_ranged(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// Resolve the range against the current size.
    ///
    /// Returns `(start, end)` with `end` exclusive, or a 416 when either bound
    /// lies beyond `size` or the bounds are inverted.
    pub fn span(&self, size: u64) -> Result<(u64, u64), ServeError> {
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(size);
        if start > size || end > size || start > end {
            return Err(ServeError::range_not_satisfiable(size));
        }
        Ok((start, end))
    }
}

/// Backing medium for resources
///
/// Implementations validate depth and mode before touching the medium and
/// report failures as [`ServeError`]s. Untyped I/O failures should be
/// converted with `?` (they become 404s).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Open `resource` for reading, honoring the optional byte range.
    async fn open_for_read(
        &self,
        resource: &str,
        mode: Mode,
        options: TransferOptions,
    ) -> Result<(ReadStream, ResourceMetadata), ServeError>;

    /// Open `resource` for writing, creating it (and its parents) if absent.
    ///
    /// [`Mode::Write`] truncates existing content, [`Mode::Append`] keeps it.
    async fn open_for_write(&self, resource: &str, mode: Mode) -> Result<WriteStream, ServeError>;
}
