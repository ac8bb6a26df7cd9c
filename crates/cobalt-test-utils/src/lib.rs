//! Testing utilities for Cobalt workspace
//!
//! Shared fixtures: demo records and temp-dir backed backends.

#![allow(missing_docs)]

use cobalt_core::{Backend, CobaltConfig, Collection, OwnerId, Record};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Demo account id used as the seed template
pub const DEMO_OWNER: u64 = 1;

/// Backend rooted in a fresh temporary directory
///
/// Keep the returned [`TempDir`] alive for as long as the backend is used.
pub fn temp_backend() -> (TempDir, Backend) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let backend = Backend::open(CobaltConfig::new().with_data_dir(dir.path()));
    (dir, backend)
}

pub fn demo_owner() -> OwnerId {
    OwnerId::from(DEMO_OWNER)
}

pub fn demo_rating(id: &str, revenue: u64, rating: &str) -> Value {
    json!({
        "id": id,
        "dateCreated": "2024-01-15",
        "revenue": revenue,
        "ebitdaMargin": 23.5,
        "fcfToDebt": 0.42,
        "debtToEbitda": 3.2,
        "netDebtToEbitda": 2.8,
        "ebitdaToInterest": 4.5,
        "roce": 18.3,
        "interestCoverage": 4.5,
        "creditRating": rating
    })
}

pub fn demo_ratings() -> Vec<Value> {
    vec![
        demo_rating("CR-2024-001", 45_200_000, "BB+"),
        demo_rating("CR-2024-002", 128_000_000, "BBB-"),
        demo_rating("CR-2024-003", 8_750_000, "B"),
    ]
}

pub fn demo_scenarios() -> Vec<Value> {
    vec![
        json!({"id": "CR-2024-001", "revenue": 45_200_000, "ebitdaMargin": 23.5, "roce": 18.3}),
        json!({"id": "CR-2024-002", "revenue": 128_000_000, "ebitdaMargin": 31.2, "roce": 24.7}),
    ]
}

/// Load the demo owner's records into both collections
pub fn seed_demo_account(backend: &Backend) {
    let owner = demo_owner();
    for rating in demo_ratings() {
        backend
            .insert(Collection::Ratings, &owner, rating)
            .expect("insert demo rating");
    }
    for scenario in demo_scenarios() {
        backend
            .insert(Collection::Scenarios, &owner, scenario)
            .expect("insert demo scenario");
    }
}

/// Ids of `records`, in order
pub fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.id().map(str::to_string))
        .collect()
}
