// Configuration module entry point
// Loads layered configuration and holds per-server shared state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, StoreConfig};

/// Default config file, looked up without extension
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file
    /// (optional), then `SERVER_*` environment variables with `__` as the
    /// section separator (e.g. `SERVER_STORE__ROOT`).
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let default_root = std::env::current_dir()
            .map_err(|e| {
                config::ConfigError::Message(format!("cannot resolve working directory: {e}"))
            })?
            .join("data");

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("store.root", default_root.to_string_lossy().into_owned())?
            .set_default("store.max_depth", 0)?
            .set_default("store.require_root", true)?
            .set_default("store.create_root", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.backlog", 128)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cfg = Config::load_from(missing.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.store.max_depth, 0);
        assert!(cfg.store.root.is_absolute());
        assert!(cfg.store.root.ends_with("data"));
        assert_eq!(cfg.performance.backlog, 128);
        assert!(cfg.logging.log_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[store]\nroot = \"/srv/resources\"\nmax_depth = 4\n"
        )
        .unwrap();

        let base = dir.path().join("server");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.store.root, std::path::PathBuf::from("/srv/resources"));
        assert_eq!(cfg.store.max_depth, 4);
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:9090".parse::<SocketAddr>().unwrap()
        );
    }
}
