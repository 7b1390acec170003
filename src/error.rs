//! Startup error types

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the server before it starts serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration could not be assembled or deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// `server.host`/`server.port` do not form a socket address.
    #[error("invalid listen address '{0}': {1}")]
    Address(String, std::net::AddrParseError),

    /// Another process already listens on the port.
    #[error("port {port} is already in use")]
    AddrInUse { port: u16 },

    /// Any other bind/listen failure.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The directory to serve is missing or unreadable.
    #[error("cannot serve directory '{}': {source}", .path.display())]
    RootDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
