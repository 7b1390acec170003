// Configuration module entry point
// Loads startup configuration and exposes the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, FilesConfig};

impl Config {
    /// Load configuration for a parsed command line.
    ///
    /// Precedence: command line > `--config` file > built-in defaults.
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", ".")?
            .set_default("files.index_files", vec!["index.html", "index.htm"])?
            .set_default("files.directory_listing", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        let settings = builder
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option(
                "server.root",
                cli.dir.as_ref().map(|d| d.to_string_lossy().into_owned()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse()
            .map_err(|e| StartupError::Address(raw.clone(), e))
    }

    /// Canonical form of the configured root directory
    pub fn resolve_root(&self) -> Result<PathBuf, StartupError> {
        let root = &self.server.root;
        let canonical = root.canonicalize().map_err(|source| StartupError::RootDir {
            path: root.clone(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(StartupError::RootDir {
                path: root.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            });
        }
        Ok(canonical)
    }
}
