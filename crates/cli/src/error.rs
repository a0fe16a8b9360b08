//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: render error (unknown source or mode, bad dimensions, bad scenario)
//! - 11: I/O error (frame write, image load, scenario read)
//! - 12: input error (malformed --impact, --params, or scenario JSON)
//! - 13: serialization error

use std::fmt;
use tileburst_core::TileError;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    /// A renderer or source error (unknown source or mode, zero-sized
    /// surface, scenario events past the last tick).
    Render(TileError),
    /// An I/O error (frame PNG write, still image load, scenario read).
    Io(String),
    /// A user input error (unparseable --params JSON or scenario file).
    Input(String),
    /// A serialization error (JSON summary output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Render(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Render(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        match e {
            TileError::Io(msg) => CliError::Io(msg),
            other => CliError::Render(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
