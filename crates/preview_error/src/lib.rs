// crates/preview_error/src/lib.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreviewError>;

/// Every way the frame previewer can fail before handing its buffer to the
/// compiler. All of them are terminal.
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("No preamble found: neither {} nor any sibling in {} declares \\documentclass", .candidate.display(), .directory.display())]
    PreambleNotFound { candidate: PathBuf, directory: PathBuf },

    #[error("No frame found in {} at or above line {line}", .path.display())]
    FrameNotFound { path: PathBuf, line: usize },

    #[error("Malformed directive in {} line {line}: {reason} ({text})", .path.display())]
    MalformedDirective {
        path: PathBuf,
        line: usize,
        text: String,
        reason: String,
    },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line} is outside {} ({len} lines)", .path.display())]
    TargetOutOfRange { path: PathBuf, line: usize, len: usize },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl PreviewError {
    /// Maps an I/O failure on `path` onto `FileNotFound` or `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PreviewError::FileNotFound(path)
        } else {
            PreviewError::Io { path, source }
        }
    }
}
