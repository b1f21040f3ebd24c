use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("{0}")]
    CommandFailed(String),
    #[error("File is not under the client root.")]
    NotTracked,
    #[error("File is already writable.")]
    AlreadyWritable,
    #[error("unexpected output from '{command}': missing {expected}")]
    FormatUnexpected {
        command: &'static str,
        expected: &'static str,
    },
    #[error("{0}")]
    PostconditionFailed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn unexpected(command: &'static str, expected: &'static str) -> Self {
        AppError::FormatUnexpected { command, expected }
    }
}

pub type AppResult<T> = Result<T, AppError>;
