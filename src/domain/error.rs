use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that cross component seams. A missing match is not an error
/// (`Option::None`), and a name that cannot be recovered keeps its original
/// spelling instead of failing.
#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("{0}")]
    Download(String),

    #[error("unsupported file type {0}")]
    UnsupportedFormat(String),

    #[error("malformed {format} archive: {reason}")]
    MalformedArchive { format: &'static str, reason: String },

    #[error("no entry named '{0}' in archive")]
    MissingEntry(String),

    #[error("cannot write to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SubtitleError {
    pub fn malformed(format: &'static str, reason: impl ToString) -> Self {
        SubtitleError::MalformedArchive {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SubtitleError::Write {
            path: path.into(),
            source,
        }
    }
}
