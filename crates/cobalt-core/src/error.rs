//! Error types for Cobalt Core
//!
//! Wraps store and surface errors so callers handle one type and map it
//! through [`CobaltError::kind`].

use cobalt_store::{ErrorKind, StoreError};
use cobalt_surface::SurfaceError;

/// Main Cobalt error type
#[derive(Debug, thiserror::Error)]
pub enum CobaltError {
    /// Collection operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Surface cache operation failed
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Request body was not a JSON object
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl CobaltError {
    /// Classify error for the caller
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::Surface(e) => e.kind(),
            Self::InvalidPayload(_) => ErrorKind::Invalid,
            Self::Config(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a not-found condition
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a conflict (duplicate id)
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}
