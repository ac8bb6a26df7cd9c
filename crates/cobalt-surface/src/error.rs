//! Error types for the surface cache

use crate::fingerprint::{Fingerprint, FingerprintError};
use cobalt_store::{ErrorKind, StoreError};

/// Surface cache error type
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// No entry exists for this fingerprint
    #[error("no scenario surface for fingerprint {0}")]
    NotFound(Fingerprint),

    /// Fingerprint could not be computed or parsed
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    /// Loading or saving the cache document failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SurfaceError {
    /// Classify error for the caller
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Fingerprint(FingerprintError::Serialization(_)) => ErrorKind::Internal,
            Self::Fingerprint(_) => ErrorKind::Invalid,
            Self::Store(e) => e.kind(),
        }
    }
}
