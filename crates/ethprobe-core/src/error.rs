//! Configuration and input validation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating endpoints or loading `ethprobe.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid RPC endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}
