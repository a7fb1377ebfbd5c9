use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {message}")]
    Api { message: String },
}

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failures reading or writing the watermark file.
///
/// `NotFound` is the expected state before the first successful send and is kept
/// apart from the other variants so callers can treat it as "never sent".
#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("watermark file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on watermark file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("watermark file {} holds {content:?}, not a timestamp", .path.display())]
    Parse { path: PathBuf, content: String },
}
