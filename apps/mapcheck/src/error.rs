//! Error types for mapcheck.
//!
//! Only tool-level problems surface here. Check outcomes (parser fail, leak
//! fail) are never errors; they are recorded in the report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("target binary is not configured (set [target].program, MAPCHECK_EXEC or --exec)")]
    MissingTarget,

    #[error("empty command template for {0}")]
    EmptyTemplate(&'static str),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("unknown output mode '{0}' (expected human or json)")]
    OutputMode(String),

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("maps directory not found: {0}")]
    MapsDirMissing(PathBuf),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    /// Returns true if this error stems from configuration and should stop
    /// the run before any file is checked.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingTarget
                | Self::EmptyTemplate(_)
                | Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::OutputMode(_)
                | Self::Pattern { .. }
                | Self::MapsDirMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
