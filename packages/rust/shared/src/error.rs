//! Error types for docmake.
//!
//! Library crates use [`DocmakeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics, except for
//! pass-through failures whose exit code is forwarded untouched.

use std::path::PathBuf;

/// Top-level error type for all docmake operations.
#[derive(Debug, thiserror::Error)]
pub enum DocmakeError {
    /// Configuration loading or parsing error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Invalid input (entry path, site declaration, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A subprocess could not be started at all.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The submodule sync command exited non-zero.
    #[error("`{command}` exited with status {code}")]
    SubmoduleSync { command: String, code: i32 },

    /// The delegated build routine exited non-zero.
    #[error("`{command}` exited with status {code}")]
    DelegatedBuild { command: String, code: i32 },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocmakeError>;

impl DocmakeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a spawn failure with the program name.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Exit code to forward as-is, for failures the subprocess already reported.
    ///
    /// Returns `None` for launcher-level errors, which get a full report instead.
    pub fn passthrough_exit_code(&self) -> Option<i32> {
        match self {
            Self::SubmoduleSync { code, .. } | Self::DelegatedBuild { code, .. } => Some(*code),
            _ => None,
        }
    }
}
