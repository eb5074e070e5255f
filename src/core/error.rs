//! Error types for treeignore

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for treeignore operations
///
/// Only configuration problems surface as errors: building a filter either
/// succeeds completely or fails with one of these. Pattern syntax errors are
/// never reported (a broken pattern compiles to an inert rule), and
/// filesystem probe failures during queries are mapped to "path does not
/// exist" rather than raised.
#[derive(Error, Debug)]
pub enum TreeIgnoreError {
    /// Configuration errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Home directory not found")]
    HomeDirectoryNotFound,

    #[error("Pattern source root cannot be resolved: {path}")]
    SourceRootUnresolvable { path: PathBuf },

    #[error("Working directory is not accessible: {0}")]
    WorkingDirectory(std::io::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeIgnoreError {
    /// Create a new configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a new unresolvable source root error
    pub fn source_root_unresolvable(path: PathBuf) -> Self {
        Self::SourceRootUnresolvable { path }
    }
}

/// Result type alias for treeignore operations
pub type Result<T> = std::result::Result<T, TreeIgnoreError>;
