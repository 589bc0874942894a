//! Retention-window expiry behavior.

use super::*;

#[test]
fn test_expiry_boundary_keeps_rows_inside_window() {
    let (db, _temp) = setup_temp_db();
    let window = Duration::days(30);
    let now = Utc::now();

    let stale = record_created_at("00000000000a", "old", now - window - Duration::seconds(1));
    let fresh = record_created_at("00000000000b", "new", now - window + Duration::seconds(1));
    db.pastes.insert(&stale).unwrap();
    db.pastes.insert(&fresh).unwrap();

    let removed = db.pastes.expire_batch(now - window, 16).unwrap();
    assert_eq!(removed, 1);
    assert!(db.pastes.get("00000000000a").unwrap().is_none());
    assert!(db.pastes.get("00000000000b").unwrap().is_some());
}

#[test]
fn test_expiry_is_idempotent() {
    let (db, _temp) = setup_temp_db();
    let cutoff = Utc::now() - Duration::days(30);
    for i in 0..3 {
        let id = format!("{:012x}", i + 1);
        db.pastes
            .insert(&record_created_at(&id, "old", cutoff - Duration::hours(i + 1)))
            .unwrap();
    }

    assert_eq!(db.pastes.expire_batch(cutoff, 16).unwrap(), 3);
    assert_eq!(db.pastes.expire_batch(cutoff, 16).unwrap(), 0);
}

#[test]
fn test_expiry_batches_are_bounded() {
    let (db, _temp) = setup_temp_db();
    let cutoff = Utc::now() - Duration::days(30);
    for i in 0..10 {
        let id = format!("{:012x}", i + 1);
        db.pastes
            .insert(&record_created_at(&id, "old", cutoff - Duration::minutes(i + 1)))
            .unwrap();
    }
    db.pastes.insert(&record("ffffffffffff", "keep")).unwrap();

    let batches: Vec<usize> = (0..5)
        .map(|_| db.pastes.expire_batch(cutoff, 3).unwrap())
        .collect();
    assert_eq!(batches, vec![3, 3, 3, 1, 0]);
    assert_eq!(db.pastes.count().unwrap(), 1);
    assert!(db.pastes.get("ffffffffffff").unwrap().is_some());
}

#[test]
fn test_purged_id_is_gone_for_fetch_and_free_for_reuse() {
    let (db, _temp) = setup_temp_db();
    let cutoff = Utc::now() - Duration::days(30);
    db.pastes
        .insert(&record_created_at("abc123def456", "old", cutoff - Duration::days(1)))
        .unwrap();

    db.pastes.expire_batch(cutoff, 16).unwrap();
    assert!(db.pastes.fetch_and_count("abc123def456").unwrap().is_none());

    let again = db.pastes.insert(&record("abc123def456", "new")).unwrap();
    assert!(matches!(again, InsertOutcome::Inserted { .. }));
}

#[test]
fn test_expiry_with_empty_store_removes_nothing() {
    let (db, _temp) = setup_temp_db();
    assert_eq!(db.pastes.expire_batch(Utc::now(), 16).unwrap(), 0);
}
