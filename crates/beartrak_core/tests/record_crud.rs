use beartrak_core::db::open_db_in_memory;
use beartrak_core::{NewRecord, RecordPatch, RecordStore, RepoError, SqliteRecordStore};
use chrono::Utc;
use std::thread::sleep;
use std::time::Duration;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let input = NewRecord::new("Demo")
        .with_url("https://x.example")
        .with_description("d");
    let created = store.insert(&input).unwrap();

    let loaded = store.get(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Demo");
    assert_eq!(loaded.url.as_deref(), Some("https://x.example"));
    assert_eq!(loaded.description.as_deref(), Some("d"));
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    assert!(store.get(99_999).unwrap().is_none());
}

#[test]
fn ids_are_not_reused_after_delete_or_clear() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let first = store.insert(&NewRecord::new("first")).unwrap();
    assert!(store.delete(first.id).unwrap());
    let second = store.insert(&NewRecord::new("second")).unwrap();
    assert!(second.id > first.id);

    store.clear(None).unwrap();
    let third = store.insert(&NewRecord::new("third")).unwrap();
    assert!(third.id > second.id);
}

#[test]
fn list_all_orders_by_name_bytewise() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    for name in ["beta", "Alpha", "alpha", "Gamma"] {
        store.insert(&NewRecord::new(name)).unwrap();
    }

    let names: Vec<String> = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Gamma", "alpha", "beta"]);
}

#[test]
fn name_only_update_keeps_other_fields_and_refreshes_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let created = store
        .insert(
            &NewRecord::new("Demo")
                .with_url("https://x.example")
                .with_description("d"),
        )
        .unwrap();

    let updated = store.update(created.id, &RecordPatch::rename("Demo2")).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Demo2");
    assert_eq!(updated.url, created.url);
    assert_eq!(updated.description, created.description);
    assert!(updated.updated_at > created.updated_at);
}

#[test]
fn consecutive_updates_always_advance_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let created = store.insert(&NewRecord::new("busy")).unwrap();

    let mut previous = created.updated_at;
    for _ in 0..5 {
        let updated = store.update(created.id, &RecordPatch::default()).unwrap();
        assert!(updated.updated_at > previous);
        previous = updated.updated_at;
    }
}

#[test]
fn explicit_null_clears_nullable_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let created = store
        .insert(&NewRecord::new("linked").with_url("https://x.example"))
        .unwrap();

    let patch = RecordPatch {
        url: Some(None),
        description: Some(Some("now described".to_string())),
        ..RecordPatch::default()
    };
    let updated = store.update(created.id, &patch).unwrap();
    assert_eq!(updated.url, None);
    assert_eq!(updated.description.as_deref(), Some("now described"));
    assert_eq!(updated.name, "linked");
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let err = store.update(42, &RecordPatch::rename("ghost")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn validation_failure_blocks_insert_and_update() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let create_err = store.insert(&NewRecord::new("")).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));

    let created = store.insert(&NewRecord::new("valid")).unwrap();
    let update_err = store
        .update(created.id, &RecordPatch::rename(""))
        .unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));
    assert_eq!(store.get(created.id).unwrap().unwrap().name, "valid");
}

#[test]
fn delete_reports_whether_a_row_was_removed() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let created = store.insert(&NewRecord::new("short lived")).unwrap();

    assert!(store.delete(created.id).unwrap());
    assert!(!store.delete(created.id).unwrap());
    assert!(store.get(created.id).unwrap().is_none());
}

#[test]
fn clear_without_cutoff_deletes_everything() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    for name in ["a1", "b2", "c3"] {
        store.insert(&NewRecord::new(name)).unwrap();
    }

    assert_eq!(store.clear(None).unwrap(), 3);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn clear_with_cutoff_deletes_only_older_records() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let old_a = store.insert(&NewRecord::new("old a")).unwrap();
    let old_b = store.insert(&NewRecord::new("old b")).unwrap();
    sleep(Duration::from_millis(20));
    let cutoff = Utc::now();
    sleep(Duration::from_millis(20));
    let fresh = store.insert(&NewRecord::new("fresh")).unwrap();

    assert_eq!(store.clear(Some(cutoff)).unwrap(), 2);
    assert!(store.get(old_a.id).unwrap().is_none());
    assert!(store.get(old_b.id).unwrap().is_none());
    assert_eq!(store.get(fresh.id).unwrap().unwrap(), fresh);
}

#[test]
fn updating_an_old_record_protects_it_from_bounded_clear() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);

    let touched = store.insert(&NewRecord::new("touched")).unwrap();
    sleep(Duration::from_millis(20));
    let cutoff = Utc::now();
    sleep(Duration::from_millis(20));
    store.update(touched.id, &RecordPatch::default()).unwrap();

    assert_eq!(store.clear(Some(cutoff)).unwrap(), 0);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn bounded_clear_honors_sub_millisecond_cutoffs() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let record = store.insert(&NewRecord::new("boundary")).unwrap();

    assert_eq!(store.clear(Some(record.updated_at)).unwrap(), 0);
    let just_after = record.updated_at + chrono::Duration::microseconds(500);
    assert_eq!(store.clear(Some(just_after)).unwrap(), 1);
    assert!(store.get(record.id).unwrap().is_none());
}
