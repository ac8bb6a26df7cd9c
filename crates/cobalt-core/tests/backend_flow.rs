//! Account lifecycle against a real data directory

use cobalt_core::prelude::*;
use cobalt_core::{PlotType, SurfaceEntry};
use cobalt_test_utils::{demo_owner, ids, seed_demo_account, temp_backend};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::thread;

#[test]
fn signup_seeds_both_collections_from_demo() {
    let (_dir, backend) = temp_backend();
    seed_demo_account(&backend);
    let newcomer = OwnerId::from(17u64);

    let report = backend.on_signup(&newcomer).unwrap();
    assert_eq!(report.ratings, 3);
    assert_eq!(report.scenarios, 2);

    let mine = backend.list(Collection::Ratings, &newcomer).unwrap();
    let demo = backend.list(Collection::Ratings, &demo_owner()).unwrap();
    assert_eq!(mine, demo);
    assert_eq!(ids(&mine.items), ["CR-2024-001", "CR-2024-002", "CR-2024-003"]);
}

#[test]
fn signup_twice_changes_nothing() {
    let (_dir, backend) = temp_backend();
    seed_demo_account(&backend);
    let newcomer = OwnerId::from(17u64);

    backend.on_signup(&newcomer).unwrap();
    backend
        .update(Collection::Ratings, &newcomer, "CR-2024-001", json!({"creditRating": "BBB"}))
        .unwrap();
    let report = backend.on_signup(&newcomer).unwrap();

    assert_eq!(report.ratings, 0);
    assert_eq!(
        backend
            .get(Collection::Ratings, &newcomer, "CR-2024-001")
            .unwrap()
            .get("creditRating"),
        Some(&json!("BBB"))
    );
}

#[test]
fn signup_without_demo_data_gives_empty_lists() {
    let (_dir, backend) = temp_backend();
    let newcomer = OwnerId::from(17u64);

    let report = backend.on_signup(&newcomer).unwrap();
    assert_eq!((report.ratings, report.scenarios), (0, 0));
    assert_eq!(backend.list(Collection::Scenarios, &newcomer).unwrap().total, 0);
}

#[test]
fn crud_round_trip() {
    let (_dir, backend) = temp_backend();
    let owner = OwnerId::from(5u64);

    let created = backend
        .insert(Collection::Ratings, &owner, json!({"id": "CR-9", "revenue": 10, "roce": 5.5}))
        .unwrap();
    assert_eq!(created.id(), Some("CR-9"));

    let updated = backend
        .update(Collection::Ratings, &owner, "CR-9", json!({"revenue": 20}))
        .unwrap();
    assert_eq!(updated.get("revenue"), Some(&json!(20)));
    assert_eq!(updated.get("roce"), Some(&json!(5.5)));

    backend.delete(Collection::Ratings, &owner, "CR-9").unwrap();
    assert!(backend
        .get(Collection::Ratings, &owner, "CR-9")
        .unwrap_err()
        .is_not_found());
}

#[test]
fn surface_submit_then_poll() {
    let (_dir, backend) = temp_backend();
    let owner = OwnerId::from(5u64);
    let body = json!({
        "computationId": "CR-2024-001",
        "revenue": 45_200_000, "revenue_lower": -10, "revenue_upper": 10,
        "roce": 18.3, "roce_lower": 0, "roce_upper": 0
    });

    let submission = backend.submit_surface(&owner, body.clone()).unwrap();
    assert_eq!(submission.status, SurfaceStatus::Pending);

    let entry = backend
        .poll_surface(&submission.fingerprint.to_string())
        .unwrap();
    let SurfaceEntry::Completed(result) = &entry else {
        panic!("poll must complete the entry");
    };
    assert_eq!(result.plot_type, PlotType::TwoD);
    assert_eq!(serde_json::to_value(&entry).unwrap()["status"], json!("completed"));

    let again = backend.submit_surface(&OwnerId::from(6u64), body).unwrap();
    assert_eq!(again.status, SurfaceStatus::Completed);
    assert_eq!(backend.poll_surface(&submission.fingerprint.to_string()).unwrap(), entry);
}

#[test]
fn shared_backend_across_threads() {
    let (_dir, backend) = temp_backend();
    seed_demo_account(&backend);
    let backend = Arc::new(backend);

    let handles: Vec<_> = (10..18u64)
        .map(|n| {
            let backend = Arc::clone(&backend);
            thread::spawn(move || {
                let owner = OwnerId::from(n);
                backend.on_signup(&owner).unwrap();
                backend
                    .insert(Collection::Scenarios, &owner, json!({"id": format!("S-{n}")}))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for n in 10..18u64 {
        let listing = backend.list(Collection::Scenarios, &OwnerId::from(n)).unwrap();
        assert_eq!(listing.total, 3);
    }
    assert_eq!(backend.list(Collection::Ratings, &demo_owner()).unwrap().total, 3);
}
