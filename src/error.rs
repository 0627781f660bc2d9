//! Error taxonomy shared by the entry model, the explorer and the index service.

use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while resolving or listing a request path.
#[derive(Debug, thiserror::Error)]
pub enum AutoIndexError {
    /// The path resolves to neither a file nor a directory.
    #[error("{0}: No such file or directory")]
    NotFound(String),

    /// A listing was requested for something that is not a directory.
    #[error("{}: Not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// `sort_by` is not one of `name`, `size`, `modified`.
    #[error("invalid sort key {0:?} (expected name, size or modified)")]
    InvalidSortKey(String),

    /// `order` is not one of `asc`, `desc`.
    #[error("invalid order {0:?} (expected asc or desc)")]
    InvalidOrder(String),

    /// The path would leave the browse root, lexically or through a symlink.
    #[error("{0}: path escapes the browse root")]
    PathEscapesRoot(String),

    /// A glob in a mimetype rule or ignore list failed to compile.
    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Any other filesystem failure.
    #[error("{}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AutoIndexError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AutoIndexError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status the serving layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AutoIndexError::NotFound(_) | AutoIndexError::NotADirectory(_) => 404,
            AutoIndexError::InvalidSortKey(_) | AutoIndexError::InvalidOrder(_) => 400,
            AutoIndexError::PathEscapesRoot(_) => 403,
            AutoIndexError::InvalidPattern { .. } | AutoIndexError::Io { .. } => 500,
        }
    }

    /// Whether the error is the client's fault (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, AutoIndexError>;
