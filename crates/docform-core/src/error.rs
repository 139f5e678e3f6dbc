use std::path::PathBuf;

use thiserror::Error;

use crate::path::Path;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("path not found: {path}")]
    PathNotFound { path: Path },
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("backup failed: {0}")]
    Backup(#[from] zip::result::ZipError),
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EditError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditError::Io { path: path.into(), source }
    }
}

pub type Result<T, E = EditError> = std::result::Result<T, E>;
