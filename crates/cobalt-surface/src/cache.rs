//! Content-addressed scenario surface cache
//!
//! Submissions are keyed by the [`Fingerprint`] of their payload, so the
//! same request from any owner lands on the same entry. There is no
//! background worker: the first poll of a pending entry computes the
//! result, stores it and from then on every poll returns that stored
//! result unchanged.
//!
//! Like the document store, each call loads the cache file, works on it
//! and writes it back while holding one exclusive lock.

use crate::entry::{Submission, SurfaceDocument, SurfaceEntry, SurfaceResult, SurfaceStatus};
use crate::error::SurfaceError;
use crate::fingerprint::Fingerprint;
use crate::synth::synthesize;
use cobalt_store::{JsonFile, OwnerId};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed memoizing cache of scenario surfaces
#[derive(Debug)]
pub struct SurfaceCache {
    file: JsonFile,
    lock: Mutex<()>,
}

impl SurfaceCache {
    /// Open cache over `path`; the file is created on first submit
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Register a request
    ///
    /// Completed entries are reported as such without touching the file.
    /// A new fingerprint gets a pending entry holding the request and the
    /// submitting owner; an existing pending entry is left as it is.
    ///
    /// # Errors
    /// Fingerprint or persistence failures.
    pub fn submit(
        &self,
        owner: &OwnerId,
        request: &Map<String, Value>,
    ) -> Result<Submission, SurfaceError> {
        let fingerprint = Fingerprint::of_payload(request)?;

        let _guard = self.lock.lock();
        let mut doc: SurfaceDocument = self.file.load()?;

        let status = match doc.scenario_surfaces.get(&fingerprint) {
            Some(entry) => {
                debug!(%fingerprint, status = ?entry.status(), "surface already known");
                entry.status()
            }
            None => {
                doc.scenario_surfaces.insert(
                    fingerprint,
                    SurfaceEntry::Pending {
                        request: request.clone(),
                        user_id: owner.clone(),
                    },
                );
                self.file.save(&doc)?;
                info!(%fingerprint, %owner, "queued scenario surface");
                SurfaceStatus::Pending
            }
        };

        Ok(Submission {
            fingerprint,
            status,
        })
    }

    /// Fetch the result, computing it on the first poll
    ///
    /// # Errors
    /// [`SurfaceError::NotFound`] for an unknown fingerprint; persistence
    /// failures otherwise. If saving the computed result fails the entry
    /// stays pending.
    pub fn poll(&self, fingerprint: &Fingerprint) -> Result<SurfaceResult, SurfaceError> {
        let _guard = self.lock.lock();
        let mut doc: SurfaceDocument = self.file.load()?;

        let result = match doc.scenario_surfaces.get(fingerprint) {
            None => return Err(SurfaceError::NotFound(*fingerprint)),
            Some(SurfaceEntry::Completed(result)) => return Ok(result.clone()),
            Some(SurfaceEntry::Pending { request, .. }) => synthesize(request),
        };

        doc.scenario_surfaces
            .insert(*fingerprint, SurfaceEntry::Completed(result.clone()));
        self.file.save(&doc)?;
        info!(
            %fingerprint,
            plot_type = ?result.plot_type,
            samples = result.sample_count(),
            "completed scenario surface"
        );
        Ok(result)
    }

    /// Current entry without advancing it
    ///
    /// # Errors
    /// Persistence failures only.
    pub fn entry(&self, fingerprint: &Fingerprint) -> Result<Option<SurfaceEntry>, SurfaceError> {
        let _guard = self.lock.lock();
        let doc: SurfaceDocument = self.file.load()?;
        Ok(doc.scenario_surfaces.get(fingerprint).cloned())
    }

    /// Number of cached entries
    ///
    /// # Errors
    /// Persistence failures only.
    pub fn len(&self) -> Result<usize, SurfaceError> {
        let _guard = self.lock.lock();
        let doc: SurfaceDocument = self.file.load()?;
        Ok(doc.scenario_surfaces.len())
    }

    /// Check for an empty cache
    ///
    /// # Errors
    /// Persistence failures only.
    pub fn is_empty(&self) -> Result<bool, SurfaceError> {
        self.len().map(|n| n == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::PlotType;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn cache() -> (TempDir, SurfaceCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = SurfaceCache::open(dir.path().join("data/scenario_surfaces.json"));
        (dir, cache)
    }

    fn request(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn one_d() -> Map<String, Value> {
        request(json!({"computationId": "CR-2024-001", "roce": 18.3, "roce_lower": -10, "roce_upper": 10}))
    }

    #[test]
    fn submit_creates_pending_entry() {
        let (_dir, cache) = cache();
        let owner = OwnerId::from(2u64);
        let submission = cache.submit(&owner, &one_d()).unwrap();

        assert_eq!(submission.status, SurfaceStatus::Pending);
        assert_eq!(
            cache.entry(&submission.fingerprint).unwrap(),
            Some(SurfaceEntry::Pending {
                request: one_d(),
                user_id: owner
            })
        );
    }

    #[test]
    fn resubmit_from_other_owner_shares_entry() {
        let (_dir, cache) = cache();
        let first = cache.submit(&OwnerId::from(2u64), &one_d()).unwrap();
        let second = cache.submit(&OwnerId::from(3u64), &one_d()).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len().unwrap(), 1);
        assert!(matches!(
            cache.entry(&first.fingerprint).unwrap(),
            Some(SurfaceEntry::Pending { user_id, .. }) if user_id == OwnerId::from(2u64)
        ));
    }

    #[test]
    fn poll_unknown_is_not_found() {
        let (_dir, cache) = cache();
        let fp = Fingerprint::compute(b"never submitted");
        assert!(matches!(cache.poll(&fp), Err(SurfaceError::NotFound(f)) if f == fp));
        assert!(!cache.path().exists());
    }

    #[test]
    fn first_poll_completes_entry() {
        let (_dir, cache) = cache();
        let submission = cache.submit(&OwnerId::from(2u64), &one_d()).unwrap();

        let result = cache.poll(&submission.fingerprint).unwrap();
        assert_eq!(result.plot_type, PlotType::OneD);
        assert_eq!(result.sample_count(), 10);
        assert_eq!(
            cache.entry(&submission.fingerprint).unwrap(),
            Some(SurfaceEntry::Completed(result))
        );
    }

    #[test]
    fn repeated_poll_returns_stored_result() {
        let (_dir, cache) = cache();
        let submission = cache.submit(&OwnerId::from(2u64), &one_d()).unwrap();

        let first = cache.poll(&submission.fingerprint).unwrap();
        let bytes_after_first = std::fs::read(cache.path()).unwrap();
        let second = cache.poll(&submission.fingerprint).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        assert_eq!(std::fs::read(cache.path()).unwrap(), bytes_after_first);
    }

    #[test]
    fn completed_entry_is_not_resynthesized() {
        let (_dir, cache) = cache();
        let submission = cache.submit(&OwnerId::from(2u64), &one_d()).unwrap();
        cache.poll(&submission.fingerprint).unwrap();

        // Tamper with the stored result; a re-synthesis would undo it.
        let mut doc: SurfaceDocument = JsonFile::new(cache.path()).load().unwrap();
        if let Some(SurfaceEntry::Completed(result)) =
            doc.scenario_surfaces.get_mut(&submission.fingerprint)
        {
            result.param_name = Some("marker".to_string());
        }
        JsonFile::new(cache.path()).save(&doc).unwrap();

        let polled = cache.poll(&submission.fingerprint).unwrap();
        assert_eq!(polled.param_name.as_deref(), Some("marker"));
    }

    #[test]
    fn submit_after_completion_reports_completed() {
        let (_dir, cache) = cache();
        let submission = cache.submit(&OwnerId::from(2u64), &one_d()).unwrap();
        cache.poll(&submission.fingerprint).unwrap();

        let again = cache.submit(&OwnerId::from(9u64), &one_d()).unwrap();
        assert_eq!(again.status, SurfaceStatus::Completed);
        assert_eq!(again.fingerprint, submission.fingerprint);
    }

    #[test]
    fn on_disk_layout() {
        let (_dir, cache) = cache();
        let submission = cache.submit(&OwnerId::from(2u64), &one_d()).unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(cache.path()).unwrap()).unwrap();
        let entry = &raw["scenario_surfaces"][submission.fingerprint.to_string()];
        assert_eq!(entry["status"], json!("pending"));
        assert_eq!(entry["user_id"], json!("2"));
        assert_eq!(entry["request"]["roce_upper"], json!(10));

        cache.poll(&submission.fingerprint).unwrap();
        let raw: Value = serde_json::from_slice(&std::fs::read(cache.path()).unwrap()).unwrap();
        let entry = &raw["scenario_surfaces"][submission.fingerprint.to_string()];
        assert_eq!(entry["status"], json!("completed"));
        assert_eq!(entry["plot_type"], json!("1D"));
        assert!(entry.get("request").is_none());
        assert_eq!(entry["timeseries"].as_object().unwrap().len(), 10);
    }
}
