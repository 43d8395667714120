//! In-memory store
//!
//! Keeps every resource as a byte buffer in a shared map. Writers append to
//! the buffer as bytes arrive, so readers opened mid-upload see a prefix.

use std::collections::HashMap;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::io::AsyncWrite;

use super::mode::{self, Direction, Mode};
use super::path;
use super::{ReadStream, ResourceMetadata, ResourceStore, TransferOptions, WriteStream};
use crate::error::ServeError;

#[derive(Debug)]
struct Entry {
    data: Vec<u8>,
    modified: SystemTime,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            modified: SystemTime::now(),
        }
    }
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// Store holding resources in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Entries,
    max_depth: usize,
}

impl MemoryStore {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Arc::default(),
            max_depth,
        }
    }

    /// Replace the content of `resource`
    pub fn insert(&self, resource: &str, data: impl Into<Vec<u8>>) -> Result<(), ServeError> {
        let key = key(resource)?;
        self.entries.lock().insert(
            key,
            Entry {
                data: data.into(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    /// Current content of `resource`, if any
    pub fn get(&self, resource: &str) -> Option<Vec<u8>> {
        let key = key(resource).ok()?;
        self.entries.lock().get(&key).map(|e| e.data.clone())
    }

    fn locate(
        &self,
        resource: &str,
        mode: Mode,
        direction: Direction,
    ) -> Result<String, ServeError> {
        path::check_depth(resource, self.max_depth)?;
        mode::check(mode, direction)?;
        key(resource)
    }
}

/// Canonical map key: `/`-joined validated segments
fn key(resource: &str) -> Result<String, ServeError> {
    Ok(format!("/{}", path::normalize(resource)?.join("/")))
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn open_for_read(
        &self,
        resource: &str,
        mode: Mode,
        options: TransferOptions,
    ) -> Result<(ReadStream, ResourceMetadata), ServeError> {
        let key = self.locate(resource, mode, Direction::Read)?;

        let entries = self.entries.lock();
        let entry = entries
            .get(&key)
            .ok_or_else(|| ServeError::not_found("resource not found"))?;

        let size = entry.data.len() as u64;
        let (start, end) = options.span(size)?;
        #[allow(clippy::cast_possible_truncation)]
        let slice = Bytes::copy_from_slice(&entry.data[start as usize..end as usize]);

        let metadata = ResourceMetadata {
            size,
            modified: Some(entry.modified),
        };
        Ok((Box::pin(Cursor::new(slice)), metadata))
    }

    async fn open_for_write(&self, resource: &str, mode: Mode) -> Result<WriteStream, ServeError> {
        let key = self.locate(resource, mode, Direction::Write)?;

        {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            if mode == Mode::Write {
                entry.data.clear();
            }
            entry.modified = SystemTime::now();
        }

        Ok(Box::pin(MemoryWriter {
            key,
            entries: Arc::clone(&self.entries),
        }))
    }
}

/// Write half handed out by [`MemoryStore::open_for_write`]
struct MemoryWriter {
    key: String,
    entries: Entries,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut entries = self.entries.lock();
        let entry = entries.entry(self.key.clone()).or_default();
        entry.data.extend_from_slice(buf);
        entry.modified = SystemTime::now();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
