use thiserror::Error;

use crate::blob::BlobError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("blob storage error: {0}")]
    Blob(#[from] BlobError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("already exists")]
    AlreadyExists,

    #[error("token lookup collision")]
    TokenLookupCollision,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("access denied")]
    AccessDenied,

    #[error("{resource} quota exceeded: limit is {limit}")]
    QuotaExceeded { resource: &'static str, limit: i64 },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("file is {size} bytes, maximum allowed is {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("invalid token format")]
    InvalidTokenFormat,

    #[error("conflict: {0}")]
    Conflict(String),
}

impl Error {
    /// True for the denial outcomes the HTTP layer renders identically.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        matches!(self, Error::AccessDenied | Error::QuotaExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
