//! Extraction error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced to callers of the extraction facade.
///
/// Malformed source never produces an error; parsers degrade to fewer
/// elements instead. Only reading the file can fail.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be read (missing, permission denied, not UTF-8).
    #[error("Failed to read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ExtractError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
