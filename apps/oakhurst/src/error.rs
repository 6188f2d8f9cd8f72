//! # Application Errors
//!
//! `AppError` is what a CLI command can fail with. It wraps the core's
//! validation and export errors, the HTTP client's errors, configuration
//! problems and file I/O.

use crate::client::ClientError;
use oakhurst_core::OakhurstError;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced to the user by the `oakhurst` binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] OakhurstError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The configuration file or an override is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },
}

impl AppError {
    /// I/O failure on a specific file.
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
