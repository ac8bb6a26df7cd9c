//! Cobalt document store
//!
//! File-backed, owner-keyed collections of schema-free JSON records.
//!
//! # Core Concepts
//!
//! - [`DocumentStore`]: one JSON file, one lock, linearizable list/get/insert/
//!   update/delete/seed operations
//! - [`JsonFile`]: whole-document load/save with atomic replace, shared by
//!   every file-backed component
//! - [`Record`]: ordered field map with a reserved string `id`
//! - [`OwnerId`]: trusted owner key supplied by the authentication layer
//!
//! # Example
//!
//! ```rust,ignore
//! use cobalt_store::{DocumentStore, OwnerId, Record};
//!
//! let ratings = DocumentStore::open("ratings", "data/credit_ratings.json");
//! let owner = OwnerId::from(7);
//! ratings.seed_if_empty(&owner, &OwnerId::from(1))?;
//! ratings.insert(&owner, Record::with_id("CR-2024-009"))?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod error;
mod file;
mod store;
mod types;

pub use document::CollectionDocument;
pub use error::{ErrorKind, StoreError};
pub use file::JsonFile;
pub use store::DocumentStore;
pub use types::{OwnerId, Record, ID_FIELD};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
