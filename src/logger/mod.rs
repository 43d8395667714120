//! Logger module
//!
//! Provides logging utilities for the resource server including:
//! - Subscriber setup (`RUST_LOG` or the configured level, optional file)
//! - Server lifecycle logging
//! - Transfer (access) logging
//! - Error and warning logging

use std::net::SocketAddr;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};
use crate::error::BoxError;

/// Initialize the tracing subscriber
///
/// Uses `RUST_LOG` if set, otherwise falls back to `logging.level`. When
/// `logging.log_file` is set, output goes to that file through a non-blocking
/// writer; the returned guard must be held until shutdown so buffered lines
/// are flushed.
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>, BoxError> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.level)?
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| format!("log file has no file name: {}", path.display()))?;

            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            builder.with_writer(writer).with_ansi(false).try_init()?;
            Ok(Some(guard))
        }
        None => {
            builder.try_init()?;
            Ok(None)
        }
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Resource server started successfully");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Store root: {}", config.store.root.display());
    if config.store.max_depth > 0 {
        tracing::info!("Max resource depth: {}", config.store.max_depth);
    }
    tracing::info!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("======================================");
}

pub fn log_server_state(from: impl std::fmt::Display, to: impl std::fmt::Display) {
    tracing::debug!("[Server] {from} -> {to}");
}

pub fn log_store_root_created(root: &Path) {
    tracing::info!("[Store] Created root directory: {}", root.display());
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::warn!("[Connection] {err}");
}

pub fn log_transfer(action: &str, resource: &str, mode: &str) {
    tracing::info!(action, resource, mode, "[Transfer] {action} {resource} ({mode})");
}

pub fn log_request_failed(resource: &str, status: u16, message: &str) {
    tracing::debug!("[Request] {resource} failed with {status}: {message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_shutdown_signal(signal: &str) {
    tracing::info!("[Signal] Received {signal}, shutting down");
}

pub fn log_server_stopped() {
    tracing::info!("[Server] Listener closed");
}
