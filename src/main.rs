use std::sync::Arc;

use clap::Parser;

use resource_server::config::{self, AppState, Config};
use resource_server::error::BoxError;
use resource_server::logger;
use resource_server::server::{signal, LogObserver, Server};
use resource_server::store::FileStore;

/// Header-driven HTTP upload/download server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,
}

fn main() -> Result<(), BoxError> {
    let args = Args::parse();
    let cfg = Config::load_from(&args.config)?;
    let _log_guard = logger::init(&cfg.logging)?;

    // Create Tokio runtime, thread count from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), BoxError> {
    let addr = cfg.get_socket_addr()?;

    let store = FileStore::new(&cfg.store).await?;
    let observer = LogObserver::new(cfg.logging.access_log);
    let state = AppState::new(Arc::new(store), Arc::new(observer))
        .with_performance(cfg.performance.keep_alive, cfg.performance.backlog);

    let server = Server::new(state);
    let bound = server.listen(addr)?;
    logger::log_server_start(&bound, &cfg);

    signal::wait_for_shutdown().await?;
    server.close().await?;
    Ok(())
}
