//! Error types for dotrun operations.
//!
//! This module defines [`DotrunError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A missing `package.json` is a configuration error and stops everything
//!   before any state is touched
//! - A fatal command failure is returned as [`DotrunError::CommandFailed`] and
//!   carried up to `main`, which exits with the child's status
//! - Use `anyhow::Error` (via `DotrunError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dotrun operations.
#[derive(Debug, Error)]
pub enum DotrunError {
    /// The project directory has no `package.json`.
    #[error("package.json not found in {path}")]
    ManifestNotFound { path: PathBuf },

    /// A dependency manifest could not be read or parsed.
    #[error("Failed to parse {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// A command exited with a non-zero status under a fatal policy.
    #[error("`{command}` exited with an error status ({code:?})")]
    CommandFailed { command: String, code: Option<i32> },

    /// A command could not be started at all.
    #[error("Failed to start `{command}`: {message}")]
    CommandSpawn { command: String, message: String },

    /// An extra environment variable was not in `KEY=VALUE` form.
    #[error("Invalid environment variable '{spec}', expected KEY=VALUE")]
    InvalidEnvVar { spec: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DotrunError {
    /// Process exit status to use when this error ends the program.
    ///
    /// Command failures mirror the child's status so that `dotrun exec`
    /// behaves like the command it wraps.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Result type alias for dotrun operations.
pub type Result<T> = std::result::Result<T, DotrunError>;
