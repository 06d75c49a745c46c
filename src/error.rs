//! Error types for perf-console

use thiserror::Error;

/// Result type alias for perf-console operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query, fetch or decode failure from the shared pipeline
    #[error(transparent)]
    CoreError(#[from] perf_console_core::Error),

    #[error("Failed to write plot to {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to render page: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}
