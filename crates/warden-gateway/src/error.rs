//! Gateway error types.

use std::net::SocketAddr;
use std::path::PathBuf;
use warden_admission::ConfigError;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Invalid gateway configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid admission policy configuration
    #[error("admission configuration error: {0}")]
    Admission(#[from] ConfigError),

    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Server socket bind error
    #[error("server bind error on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// HTTP server stopped with an error
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Global subscriber already installed
    #[error("logging setup failed: {0}")]
    Logging(String),
}
