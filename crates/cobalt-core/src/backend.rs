//! Backend facade
//!
//! Owns one store per collection plus the surface cache, each with its
//! own file and lock. Request-facing methods take already-decoded JSON
//! bodies and a trusted owner id, and return values ready to serialize.

use crate::config::CobaltConfig;
use crate::error::CobaltError;
use cobalt_store::{DocumentStore, OwnerId, Record, StoreError};
use cobalt_surface::{Fingerprint, Submission, SurfaceCache, SurfaceEntry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::info;

/// Owner-keyed record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Credit ratings (the portfolio)
    Ratings,
    /// Saved scenarios
    Scenarios,
}

impl Collection {
    /// Stable name
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ratings => "ratings",
            Self::Scenarios => "scenarios",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = CobaltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ratings" | "credit_ratings" | "portfolio" => Ok(Self::Ratings),
            "scenarios" => Ok(Self::Scenarios),
            other => Err(CobaltError::Config(format!("unknown collection '{other}'"))),
        }
    }
}

/// Listing envelope returned for a whole collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Number of items
    pub total: usize,
    /// Records in insertion order
    pub items: Vec<Record>,
}

impl From<Vec<Record>> for Listing {
    fn from(items: Vec<Record>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Records copied into each collection by [`Backend::on_signup`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// Ratings copied
    pub ratings: usize,
    /// Scenarios copied
    pub scenarios: usize,
}

/// All persistent state of one deployment
#[derive(Debug)]
pub struct Backend {
    config: CobaltConfig,
    ratings: DocumentStore,
    scenarios: DocumentStore,
    surfaces: SurfaceCache,
}

impl Backend {
    /// Open every document named by `config`
    ///
    /// Nothing is read until the first call.
    #[must_use]
    pub fn open(config: CobaltConfig) -> Self {
        let ratings = DocumentStore::open(Collection::Ratings.name(), config.ratings_path());
        let scenarios = DocumentStore::open(Collection::Scenarios.name(), config.scenarios_path());
        let surfaces = SurfaceCache::open(config.surfaces_path());
        info!(data_dir = %config.data_dir.display(), "opened cobalt backend");
        Self {
            config,
            ratings,
            scenarios,
            surfaces,
        }
    }

    /// Store backing `collection`
    #[inline]
    #[must_use]
    pub fn store(&self, collection: Collection) -> &DocumentStore {
        match collection {
            Collection::Ratings => &self.ratings,
            Collection::Scenarios => &self.scenarios,
        }
    }

    /// Seed a freshly created account from the template owner
    ///
    /// # Errors
    /// Persistence failures.
    pub fn on_signup(&self, owner: &OwnerId) -> Result<SeedReport, CobaltError> {
        let template = self.config.template();
        let report = SeedReport {
            ratings: self.ratings.seed_if_empty(owner, &template)?,
            scenarios: self.scenarios.seed_if_empty(owner, &template)?,
        };
        info!(%owner, ratings = report.ratings, scenarios = report.scenarios, "seeded new account");
        Ok(report)
    }

    /// Every record of `owner` in `collection`
    ///
    /// # Errors
    /// Persistence failures.
    pub fn list(&self, collection: Collection, owner: &OwnerId) -> Result<Listing, CobaltError> {
        Ok(self.store(collection).list(owner)?.into())
    }

    /// One record, absent records being an error
    ///
    /// # Errors
    /// [`StoreError::NotFound`] or persistence failures.
    pub fn get(
        &self,
        collection: Collection,
        owner: &OwnerId,
        id: &str,
    ) -> Result<Record, CobaltError> {
        self.store(collection)
            .get(owner, id)?
            .ok_or_else(|| not_found(owner, id))
    }

    /// Add a record from a request body
    ///
    /// # Errors
    /// Non-object body, missing or duplicate id, persistence failures.
    pub fn insert(
        &self,
        collection: Collection,
        owner: &OwnerId,
        body: Value,
    ) -> Result<Record, CobaltError> {
        let record = Record::from(object(body)?);
        Ok(self.store(collection).insert(owner, record)?)
    }

    /// Merge a partial request body into a record
    ///
    /// # Errors
    /// Non-object body, unknown record, persistence failures.
    pub fn update(
        &self,
        collection: Collection,
        owner: &OwnerId,
        id: &str,
        body: Value,
    ) -> Result<Record, CobaltError> {
        let fields = object(body)?;
        Ok(self.store(collection).update(owner, id, &fields)?)
    }

    /// Delete a record, absent records being an error
    ///
    /// # Errors
    /// [`StoreError::NotFound`] or persistence failures.
    pub fn delete(
        &self,
        collection: Collection,
        owner: &OwnerId,
        id: &str,
    ) -> Result<(), CobaltError> {
        if self.store(collection).delete(owner, id)? {
            Ok(())
        } else {
            Err(not_found(owner, id))
        }
    }

    /// Submit a scenario surface request body
    ///
    /// # Errors
    /// Non-object body, fingerprint or persistence failures.
    pub fn submit_surface(&self, owner: &OwnerId, body: Value) -> Result<Submission, CobaltError> {
        let request = object(body)?;
        Ok(self.surfaces.submit(owner, &request)?)
    }

    /// Poll a surface by its textual fingerprint
    ///
    /// Returns the completed entry so the serialized answer carries
    /// `"status": "completed"` next to the result.
    ///
    /// # Errors
    /// Malformed or unknown fingerprint, persistence failures.
    pub fn poll_surface(&self, fingerprint: &str) -> Result<SurfaceEntry, CobaltError> {
        let fingerprint: Fingerprint = fingerprint
            .parse()
            .map_err(cobalt_surface::SurfaceError::from)?;
        let result = self.surfaces.poll(&fingerprint)?;
        Ok(SurfaceEntry::Completed(result))
    }
}

fn object(body: Value) -> Result<Map<String, Value>, CobaltError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(CobaltError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn not_found(owner: &OwnerId, id: &str) -> CobaltError {
    StoreError::NotFound {
        owner: owner.clone(),
        id: id.to_string(),
    }
    .into()
}
