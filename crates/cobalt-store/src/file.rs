//! Whole-document JSON persistence
//!
//! [`JsonFile`] is the load/save primitive shared by every file-backed
//! component. It knows nothing about document shape or locking: callers
//! serialize access themselves and hand it complete documents.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A JSON document stored as a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Create handle for `path`; nothing touches the filesystem yet
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document
    ///
    /// A missing file is the empty document (`T::default()`).
    ///
    /// # Errors
    /// [`StoreError::Io`] on read failure, [`StoreError::Corrupt`] if the
    /// contents do not parse as `T`.
    pub fn load<T>(&self) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document missing, using empty");
                return Ok(T::default());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        debug!(path = %self.path.display(), bytes = bytes.len(), "loaded document");
        serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&self.path, e))
    }

    /// Serialize and atomically replace the document
    ///
    /// Output is pretty-printed with a four-space indent. The parent
    /// directory is created on demand. Bytes go to a temporary file in the
    /// same directory which is then renamed over the target, so readers
    /// see either the old document or the new one, never a torn write.
    ///
    /// # Errors
    /// [`StoreError::Io`] if any filesystem step fails; the previous
    /// document is left in place.
    pub fn save<T>(&self, document: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let bytes = to_pretty_vec(document).map_err(|e| StoreError::corrupt(&self.path, e))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut temp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&self.path, e))?;
        temp.write_all(&bytes)
            .map_err(|e| StoreError::io(&self.path, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "saved document");
        Ok(())
    }
}

fn to_pretty_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}
