/// Storage interface for the gallery
///
/// The view only talks to an `ImageStore`; `Library` (SQLite) is the
/// one implementation shipped with the app.

use rusqlite::ErrorCode;
use thiserror::Error;

use super::data::{ImageFile, ImageRecord};

/// Failures of the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database location does not exist and could not be created
    #[error("database not found: {0}")]
    NotFound(String),

    /// The host refused access to the database
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A read or write transaction failed and was rolled back
    #[error("transaction aborted: {0}")]
    TransactionAborted(String),

    /// The database was written by a newer schema than we understand
    #[error("database schema version {found} is newer than supported version {supported}")]
    VersionMismatch { found: i64, supported: i64 },

    /// A stored row could not be turned back into a record
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::CannotOpen
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::AuthorizationForStatementDenied => {
                    StoreError::PermissionDenied(err.to_string())
                }
                ErrorCode::NotFound => StoreError::NotFound(err.to_string()),
                ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => {
                    StoreError::Corrupt(err.to_string())
                }
                _ => StoreError::TransactionAborted(err.to_string()),
            },
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => StoreError::Corrupt(err.to_string()),
            _ => StoreError::TransactionAborted(err.to_string()),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => StoreError::PermissionDenied(err.to_string()),
            std::io::ErrorKind::NotFound => StoreError::NotFound(err.to_string()),
            _ => StoreError::TransactionAborted(err.to_string()),
        }
    }
}

/// A durable, single-table image catalog
///
/// There is deliberately no update, delete or query operation: records
/// are written once and read back in full.
pub trait ImageStore {
    /// Store a new record for `file` and return its key
    fn insert(&mut self, file: &ImageFile) -> StoreResult<i64>;

    /// Every record currently stored, in no guaranteed order
    fn list_all(&self) -> StoreResult<Vec<ImageRecord>>;
}
