use beartrak_core::db::open_db_in_memory;
use beartrak_core::{
    sample_records, NewRecord, Record, RecordId, RecordPatch, RecordService, RecordStore,
    RepoResult, ServiceError, SqliteRecordStore, TransportOptions,
};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::cell::Cell;

/// Delegating store that counts search round trips.
struct CountingStore<'a> {
    inner: SqliteRecordStore<'a>,
    searches: &'a Cell<usize>,
}

impl RecordStore for CountingStore<'_> {
    fn insert(&self, record: &NewRecord) -> RepoResult<Record> {
        self.inner.insert(record)
    }
    fn get(&self, id: RecordId) -> RepoResult<Option<Record>> {
        self.inner.get(id)
    }
    fn list_all(&self) -> RepoResult<Vec<Record>> {
        self.inner.list_all()
    }
    fn search(&self, text: &str) -> RepoResult<Vec<Record>> {
        self.searches.set(self.searches.get() + 1);
        self.inner.search(text)
    }
    fn update(&self, id: RecordId, patch: &RecordPatch) -> RepoResult<Record> {
        self.inner.update(id, patch)
    }
    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        self.inner.delete(id)
    }
    fn clear(&self, older_than: Option<DateTime<Utc>>) -> RepoResult<u64> {
        self.inner.clear(older_than)
    }
    fn count(&self) -> RepoResult<u64> {
        self.inner.count()
    }
}

fn service(conn: &Connection) -> RecordService<SqliteRecordStore<'_>> {
    RecordService::new(SqliteRecordStore::new(conn), TransportOptions::default())
}

#[test]
fn short_queries_never_reach_the_store() {
    let conn = open_db_in_memory().unwrap();
    let searches = Cell::new(0);
    let service = RecordService::new(
        CountingStore {
            inner: SqliteRecordStore::new(&conn),
            searches: &searches,
        },
        TransportOptions::default(),
    );

    for query in ["", " ", "a", "  b  ", "\t\n"] {
        assert!(service.search(query).unwrap().is_empty());
    }
    assert_eq!(searches.get(), 0);

    service.search("ab").unwrap();
    service.search(" xy ").unwrap();
    assert_eq!(searches.get(), 2);
}

#[test]
fn search_returns_views_for_matches() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.seed_if_empty(&sample_records()).unwrap();

    let hits = service.search("SOFTWARE").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Software Development Services");
    assert!(hits[0].description.is_some());

    assert!(!service.search("marketing").unwrap().is_empty());
    assert!(!service.search("university").unwrap().is_empty());
}

#[test]
fn hidden_description_is_withheld_from_views_but_still_searched() {
    let conn = open_db_in_memory().unwrap();
    let service = RecordService::new(
        SqliteRecordStore::new(&conn),
        TransportOptions {
            expose_description: false,
        },
    );
    service
        .create(&NewRecord::new("Bridge repair").with_description("steel inspection"))
        .unwrap();

    let hits = service.search("inspection").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].description, None);

    let json = serde_json::to_value(&hits[0]).unwrap();
    assert!(json.get("description").is_none());
}

#[test]
fn create_then_get_returns_equal_record() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(
            &NewRecord::new("Demo")
                .with_url("https://x.example")
                .with_description("d"),
        )
        .unwrap();
    let loaded = service.get(created.id).unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.url.as_deref(), Some("https://x.example"));
}

#[test]
fn missing_ids_translate_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(matches!(service.get(7), Err(ServiceError::NotFound(7))));
    assert!(matches!(
        service.update(7, &RecordPatch::rename("x")),
        Err(ServiceError::NotFound(7))
    ));
    assert!(matches!(service.delete(7), Err(ServiceError::NotFound(7))));
}

#[test]
fn invalid_input_translates_to_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create(&NewRecord::new("")).unwrap_err();
    match err {
        ServiceError::Validation(inner) => assert_eq!(inner.field(), "name"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn end_to_end_create_update_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service
        .create(
            &NewRecord::new("Demo")
                .with_url("https://x.example")
                .with_description("d"),
        )
        .unwrap();

    let updated = service
        .update(created.id, &RecordPatch::rename("Demo2"))
        .unwrap();
    assert_eq!(updated.name, "Demo2");
    assert_eq!(updated.url, created.url);
    assert_eq!(updated.description, created.description);
    assert!(updated.updated_at > created.updated_at);

    service.delete(created.id).unwrap();
    assert!(matches!(
        service.get(created.id),
        Err(ServiceError::NotFound(_))
    ));
}

#[test]
fn clear_reports_count_and_message() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.create(&NewRecord::new("one")).unwrap();
    service.create(&NewRecord::new("two")).unwrap();

    let outcome = service.clear(None).unwrap();
    assert_eq!(outcome.deleted_count, 2);
    assert!(outcome.message.contains("Database cleared successfully"));
    assert!(service.list().unwrap().is_empty());

    let cutoff = Utc::now();
    let bounded = service.clear(Some(cutoff)).unwrap();
    assert_eq!(bounded.deleted_count, 0);
    assert!(bounded.message.contains("older than"));
}

#[test]
fn seeding_only_happens_on_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let samples = sample_records();

    assert_eq!(service.seed_if_empty(&samples).unwrap(), samples.len());
    assert_eq!(service.seed_if_empty(&samples).unwrap(), 0);
    assert_eq!(service.list().unwrap().len(), samples.len());
}
