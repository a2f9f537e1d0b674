use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the whole run. Per-probe failures never surface here,
/// they are recorded on the `ProbeResult` instead.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("Failed to read suite config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid suite config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid suite config {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to write report to {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write console output: {0}")]
    Console(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SmokeError>;
