//! Application error types for core storage and domain logic.
use crate::crypto::CodecError;
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Could not allocate a unique paste id after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    #[error("Paste '{paste_id}' could not be decoded: {source}")]
    CorruptEntry {
        paste_id: String,
        #[source]
        source: CodecError,
    },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Random source failure: {0}")]
    Entropy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Short stable label for logging without leaking payloads.
    ///
    /// # Returns
    /// A static kind string such as `"not_found"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Serialization(_) => "serialization",
            Self::Validation(_) => "validation",
            Self::NotFound => "not_found",
            Self::AllocationExhausted { .. } => "allocation_exhausted",
            Self::CorruptEntry { .. } => "corrupt_entry",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Entropy(_) => "entropy",
            Self::Config(_) => "config",
            Self::Internal => "internal",
        }
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}
