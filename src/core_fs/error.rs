use crate::core_reply::codes;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileSystemError {
    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl FileSystemError {
    pub fn to_ftp_response(&self) -> (u16, String) {
        match self {
            FileSystemError::InvalidPath(path) => {
                (codes::FILE_NAME_NOT_ALLOWED, format!("File name not allowed: {}", path))
            }
            other => (codes::FILE_UNAVAILABLE, format!("{}.", other)),
        }
    }
}
