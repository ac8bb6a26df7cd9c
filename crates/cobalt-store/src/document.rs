//! On-disk shape of an owner-keyed collection
//!
//! ```json
//! { "users": { "<owner-id>": [ { "id": "...", ... }, ... ] } }
//! ```

use crate::types::{OwnerId, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Full collection document: every owner and every record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    /// Records per owner, in insertion order
    #[serde(default)]
    pub users: IndexMap<OwnerId, Vec<Record>>,
}

impl CollectionDocument {
    /// Records for `owner`, empty if the owner has no slot
    #[must_use]
    pub fn records(&self, owner: &OwnerId) -> &[Record] {
        self.users.get(owner).map_or(&[][..], Vec::as_slice)
    }

    /// Mutable slot for `owner`, if one exists
    pub fn records_mut(&mut self, owner: &OwnerId) -> Option<&mut Vec<Record>> {
        self.users.get_mut(owner)
    }

    /// Mutable slot for `owner`, created empty if absent
    pub fn slot(&mut self, owner: &OwnerId) -> &mut Vec<Record> {
        self.users.entry(owner.clone()).or_default()
    }

    /// Position of the first record with `id`
    #[must_use]
    pub fn position(&self, owner: &OwnerId, id: &str) -> Option<usize> {
        self.records(owner).iter().position(|r| r.id() == Some(id))
    }

    /// Total number of records across owners
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }
}
