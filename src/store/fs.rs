//! Filesystem-backed store
//!
//! Resources live as plain files under a fixed absolute root. See
//! [`path::resolve`] for the logical-to-physical mapping.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::mode::{self, Direction, Mode};
use super::path;
use super::{ReadStream, ResourceMetadata, ResourceStore, TransferOptions, WriteStream};
use crate::config::StoreConfig;
use crate::error::{ServeError, StoreInitError};
use crate::logger;

/// Store rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    max_depth: usize,
}

impl FileStore {
    /// Validate the configured root and build the store.
    ///
    /// The root must be absolute. With `require_root` it must exist as a
    /// directory, unless `create_root` allows creating it here.
    pub async fn new(config: &StoreConfig) -> Result<Self, StoreInitError> {
        let root = config.root.clone();
        if !root.is_absolute() {
            return Err(StoreInitError::RootNotAbsolute(root));
        }

        if config.require_root {
            match fs::metadata(&root).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => return Err(StoreInitError::RootNotDirectory(root)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    if !config.create_root {
                        return Err(StoreInitError::RootMissing(root));
                    }
                    fs::create_dir_all(&root).await?;
                    logger::log_store_root_created(&root);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self {
            root,
            max_depth: config.max_depth,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run the pre-access checks and map the resource to a file path
    fn locate(
        &self,
        resource: &str,
        mode: Mode,
        direction: Direction,
    ) -> Result<PathBuf, ServeError> {
        path::check_depth(resource, self.max_depth)?;
        mode::check(mode, direction)?;
        path::resolve(&self.root, resource)
    }
}

#[async_trait]
impl ResourceStore for FileStore {
    async fn open_for_read(
        &self,
        resource: &str,
        mode: Mode,
        options: TransferOptions,
    ) -> Result<(ReadStream, ResourceMetadata), ServeError> {
        let path = self.locate(resource, mode, Direction::Read)?;

        // Metadata comes from the open handle, so size and existence agree
        let mut file = File::open(&path).await?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(ServeError::not_found("resource not found"));
        }

        let size = meta.len();
        let (start, end) = options.span(size)?;
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }

        let metadata = ResourceMetadata {
            size,
            modified: meta.modified().ok(),
        };
        Ok((Box::pin(file.take(end - start)), metadata))
    }

    async fn open_for_write(&self, resource: &str, mode: Mode) -> Result<WriteStream, ServeError> {
        let path = self.locate(resource, mode, Direction::Write)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut opts = OpenOptions::new();
        opts.create(true);
        if mode == Mode::Append {
            opts.append(true);
        } else {
            opts.write(true).truncate(true);
        }

        let file = opts.open(&path).await?;
        Ok(Box::pin(file))
    }
}
