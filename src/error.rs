//! Error types for dscompare operations

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Path not found: {}", path.display())]
    PathNotFound { path: PathBuf },

    #[error("Unsupported file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Not a directory: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Directory scan error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl CompareError {
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryNotFound { path: path.into() }
    }

    /// Wrap a reader failure, keeping the whole context chain in the message
    pub fn read(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        Self::Read {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }
}
