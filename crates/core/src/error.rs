//! Error types for perf-console-core (WASM-compatible)

use thiserror::Error;

/// Result type alias for perf-console-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that work in both native and WASM environments
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("HTTP status {status} for {path}")]
    StatusError { status: u16, path: String },

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Invalid parameter `{key}`: {value}")]
    InvalidParam { key: String, value: String },

    #[error("{0}")]
    Other(String),
}
