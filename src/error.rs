use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::settings::ConfigError;

/// Errors in the shim's own command line, before any policy is applied
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("no command given")]
    MissingCommand,

    #[error("option '{0}' requires a value")]
    MissingOptionValue(String),

    #[error("option '{0}' was given an empty value")]
    EmptyOptionValue(String),

    #[error("option '{0}' is not supported")]
    UnsupportedOption(String),

    #[error("argument is not valid UTF-8: {0}")]
    InvalidUnicode(String),
}

/// Errors that can occur while running the delegate binary
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("failed to launch {}: {source}", path.display())]
    LaunchFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot run in directory {}: {source}", path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Top-level application error that wraps all module-specific errors
///
/// Every variant ends the process with exit code 1 and never reaches the
/// delegate. Policy rejections are not errors; they are a `Verdict`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(#[from] UsageError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Delegate(#[from] DelegateError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether the `--help` hint should follow the message
    pub fn is_usage(&self) -> bool {
        matches!(self, AppError::Usage(_))
    }
}

/// Result type for delegate operations
pub type Result<T> = std::result::Result<T, DelegateError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
