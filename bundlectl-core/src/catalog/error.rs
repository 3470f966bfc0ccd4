//! Index error types with actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by [`Index`](super::Index) operations
#[derive(Error, Debug)]
pub enum IndexError {
    /// The entry to remove is not part of the index
    #[error("cannot remove {name}: not found")]
    NotFound { name: String },

    /// The name lookup and the entry sequence disagree
    #[error("inconsistent index state: {reason}")]
    InconsistentState { reason: String },

    /// Reading or writing the index file failed
    #[error("index file I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index file is not a valid sequence of entries
    #[error("cannot parse index {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Serializing the entries failed
    #[error("cannot marshal index")]
    Marshal {
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Two entries in the same file share a name
    #[error("duplicate entry found: {name} (in {path})")]
    Duplicate { name: String, path: PathBuf },
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        IndexError::InconsistentState {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
