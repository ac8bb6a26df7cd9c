//! Error types for the document store
//!
//! Two caller-visible conditions (duplicate id, missing record) and one
//! persistence category covering every read or write failure of the
//! backing file. Persistence errors are fatal for the triggering operation;
//! the store never retries and never leaves a half-applied mutation behind.

use crate::types::OwnerId;
use std::path::PathBuf;

/// Coarse classification used by callers to pick an external representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Conflicts with existing state (409-style)
    Conflict,
    /// Addressed record or entry does not exist (404-style)
    NotFound,
    /// Caller supplied malformed input (400-style)
    Invalid,
    /// Storage failure (500-style)
    Internal,
}

/// Document store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with the same id already exists for this owner
    #[error("record '{id}' already exists for owner {owner}")]
    DuplicateId { owner: OwnerId, id: String },

    /// No record with this id exists for this owner
    #[error("record '{id}' not found for owner {owner}")]
    NotFound { owner: OwnerId, id: String },

    /// Record is missing the reserved string `id` field
    #[error("record has no string 'id' field")]
    MissingId,

    /// Reading or writing the document file failed
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document file exists but is not a valid collection document
    #[error("corrupt document {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Classify error for the caller
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MissingId => ErrorKind::Invalid,
            Self::Io { .. } | Self::Corrupt { .. } => ErrorKind::Internal,
        }
    }

    /// Check if error came from the backing file rather than the request
    #[inline]
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Corrupt { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }
}
