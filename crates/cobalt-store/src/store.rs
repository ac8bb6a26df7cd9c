//! Owner-keyed document store
//!
//! One [`DocumentStore`] owns one JSON file. Every operation, reads
//! included, runs as load → inspect/mutate → (save) inside the same
//! exclusive critical section, so operations against one document are
//! linearizable in lock order. Distinct stores have distinct locks and
//! never block each other.
//!
//! No copy of the document outlives a call: the file is authoritative.

use crate::document::CollectionDocument;
use crate::error::StoreError;
use crate::file::JsonFile;
use crate::types::{OwnerId, Record};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a mutation closure: the value to return and whether to persist
enum Mutation<R> {
    Changed(R),
    Unchanged(R),
}

/// File-backed collection of records grouped by owner
#[derive(Debug)]
pub struct DocumentStore {
    name: String,
    file: JsonFile,
    lock: Mutex<()>,
}

impl DocumentStore {
    /// Open store over `path`
    ///
    /// The file need not exist; it is created on first mutation.
    #[must_use]
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: JsonFile::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Collection name used in logs
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// All records for `owner` in stored order
    ///
    /// An unknown owner yields an empty list.
    ///
    /// # Errors
    /// Persistence errors only.
    pub fn list(&self, owner: &OwnerId) -> Result<Vec<Record>, StoreError> {
        self.read(|doc| doc.records(owner).to_vec())
    }

    /// First record for `owner` whose id is `id`
    ///
    /// # Errors
    /// Persistence errors only; absence is `Ok(None)`.
    pub fn get(&self, owner: &OwnerId, id: &str) -> Result<Option<Record>, StoreError> {
        self.read(|doc| {
            doc.records(owner)
                .iter()
                .find(|r| r.id() == Some(id))
                .cloned()
        })
    }

    /// Append `record` to the owner's list
    ///
    /// Returns the record unchanged.
    ///
    /// # Errors
    /// - [`StoreError::MissingId`] if the record has no string `id`
    /// - [`StoreError::DuplicateId`] if the owner already holds that id;
    ///   the document is not modified
    pub fn insert(&self, owner: &OwnerId, record: Record) -> Result<Record, StoreError> {
        let id = record.id().ok_or(StoreError::MissingId)?.to_string();

        self.mutate(|doc| {
            if doc.position(owner, &id).is_some() {
                warn!(store = %self.name, %owner, %id, "rejected duplicate id");
                return Err(StoreError::DuplicateId {
                    owner: owner.clone(),
                    id,
                });
            }
            doc.slot(owner).push(record.clone());
            info!(store = %self.name, %owner, %id, "inserted record");
            Ok(Mutation::Changed(record))
        })
    }

    /// Merge `fields` into the record with `id`
    ///
    /// Keys present in `fields` overwrite; all others are kept. The `id`
    /// key itself is never rewritten. Returns the merged record.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if no such record exists.
    pub fn update(
        &self,
        owner: &OwnerId,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Record, StoreError> {
        self.mutate(|doc| {
            let not_found = || StoreError::NotFound {
                owner: owner.clone(),
                id: id.to_string(),
            };
            let index = doc.position(owner, id).ok_or_else(not_found)?;
            let record = doc
                .records_mut(owner)
                .and_then(|records| records.get_mut(index))
                .ok_or_else(not_found)?;

            record.merge(fields);
            info!(store = %self.name, %owner, %id, fields = fields.len(), "updated record");
            Ok(Mutation::Changed(record.clone()))
        })
    }

    /// Remove the first record with `id`
    ///
    /// Returns whether anything was removed; the file is only rewritten
    /// when it was.
    ///
    /// # Errors
    /// Persistence errors only.
    pub fn delete(&self, owner: &OwnerId, id: &str) -> Result<bool, StoreError> {
        self.mutate(|doc| {
            let Some(index) = doc.position(owner, id) else {
                return Ok(Mutation::Unchanged(false));
            };
            if let Some(records) = doc.records_mut(owner) {
                records.remove(index);
            }
            info!(store = %self.name, %owner, %id, "deleted record");
            Ok(Mutation::Changed(true))
        })
    }

    /// Copy `template`'s records into `owner` if `owner` has none
    ///
    /// Records are copied verbatim, ids included. An empty template
    /// leaves the owner with an empty list. Returns the number of records
    /// seeded; zero when the owner already had records.
    ///
    /// # Errors
    /// Persistence errors only.
    pub fn seed_if_empty(&self, owner: &OwnerId, template: &OwnerId) -> Result<usize, StoreError> {
        self.mutate(|doc| {
            if !doc.records(owner).is_empty() {
                debug!(store = %self.name, %owner, "already populated, skip seed");
                return Ok(Mutation::Unchanged(0));
            }

            let source = doc.records(template).to_vec();
            let had_slot = doc.users.contains_key(owner);
            let count = source.len();
            *doc.slot(owner) = source;

            if count == 0 && had_slot {
                return Ok(Mutation::Unchanged(0));
            }
            info!(store = %self.name, %owner, %template, count, "seeded owner");
            Ok(Mutation::Changed(count))
        })
    }

    /// Owners present in the document, in file order
    ///
    /// # Errors
    /// Persistence errors only.
    pub fn owners(&self) -> Result<Vec<OwnerId>, StoreError> {
        self.read(|doc| doc.users.keys().cloned().collect())
    }

    /// Run `f` against a freshly loaded document under the lock
    fn read<R>(&self, f: impl FnOnce(&CollectionDocument) -> R) -> Result<R, StoreError> {
        let _guard = self.lock.lock();
        let doc: CollectionDocument = self.file.load()?;
        Ok(f(&doc))
    }

    /// Load, mutate and persist under the lock
    ///
    /// If `f` fails or the save fails, the in-memory document is dropped
    /// and the file is left as it was.
    fn mutate<R>(
        &self,
        f: impl FnOnce(&mut CollectionDocument) -> Result<Mutation<R>, StoreError>,
    ) -> Result<R, StoreError> {
        let _guard = self.lock.lock();
        let mut doc: CollectionDocument = self.file.load()?;

        match f(&mut doc)? {
            Mutation::Changed(result) => {
                self.file.save(&doc)?;
                Ok(result)
            }
            Mutation::Unchanged(result) => Ok(result),
        }
    }
}
