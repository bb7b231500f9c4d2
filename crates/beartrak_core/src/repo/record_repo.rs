//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, substring search and bulk clear over the `records` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write is a single SQL statement.
//! - Listing and search order by `name` with `BINARY` collation, then `id`.
//! - `updated_at` is stored as epoch milliseconds and strictly increases on
//!   each update of the same row.

use crate::db::DbError;
use crate::model::record::{NewRecord, Record, RecordId, RecordPatch, RecordValidationError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_COLUMNS: &str = "id, name, url, description, updated_at";
const NAME_ORDER: &str = "ORDER BY name COLLATE BINARY ASC, id ASC";

/// Trimmed search text shorter than this returns no results.
pub const MIN_SEARCH_CHARS: usize = 2;

static LIKE_SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\\%_]").expect("valid like-escape regex"));

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RecordValidationError),
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for records.
pub trait RecordStore {
    /// Assigns a fresh id and `updated_at = now`, then returns the stored row.
    fn insert(&self, record: &NewRecord) -> RepoResult<Record>;
    fn get(&self, id: RecordId) -> RepoResult<Option<Record>>;
    fn list_all(&self) -> RepoResult<Vec<Record>>;
    /// Case-insensitive substring match on `name` or `description`.
    fn search(&self, text: &str) -> RepoResult<Vec<Record>>;
    /// Applies supplied fields only. Returns `NotFound` for unknown ids.
    fn update(&self, id: RecordId, patch: &RecordPatch) -> RepoResult<Record>;
    /// Returns whether a row was removed.
    fn delete(&self, id: RecordId) -> RepoResult<bool>;
    /// Deletes everything, or rows with `updated_at` strictly before the cutoff.
    fn clear(&self, older_than: Option<DateTime<Utc>>) -> RepoResult<u64>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed record store borrowing one session connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn insert(&self, record: &NewRecord) -> RepoResult<Record> {
        record.validate()?;

        let row = self.conn.query_row(
            &format!(
                "INSERT INTO records (name, url, description, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {RECORD_COLUMNS};"
            ),
            params![
                record.name.as_str(),
                record.url.as_deref(),
                record.description.as_deref(),
                now_epoch_ms(),
            ],
            read_row,
        )?;

        row.into_record()
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<Record>> {
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1;"),
                [id],
                read_row,
            )
            .optional()?
            .map(RecordRow::into_record)
            .transpose()
    }

    fn list_all(&self) -> RepoResult<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM records {NAME_ORDER};"))?;
        let rows = stmt.query_map([], read_row)?;
        collect_records(rows)
    }

    fn search(&self, text: &str) -> RepoResult<Vec<Record>> {
        let needle = text.trim();
        if needle.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", LIKE_SPECIAL_RE.replace_all(needle, r"\$0"));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records
             WHERE name LIKE ?1 ESCAPE '\\'
                OR description LIKE ?1 ESCAPE '\\'
             {NAME_ORDER};"
        ))?;
        let rows = stmt.query_map([pattern], read_row)?;
        collect_records(rows)
    }

    fn update(&self, id: RecordId, patch: &RecordPatch) -> RepoResult<Record> {
        patch.validate()?;

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = &patch.name {
            assignments.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(url) = &patch.url {
            assignments.push("url = ?");
            bind_values.push(nullable_text(url));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            bind_values.push(nullable_text(description));
        }
        assignments.push("updated_at = MAX(?, updated_at + 1)");
        bind_values.push(Value::Integer(now_epoch_ms()));
        bind_values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE records SET {} WHERE id = ? RETURNING {RECORD_COLUMNS};",
            assignments.join(", ")
        );
        let row = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), read_row)
            .optional()?;

        match row {
            Some(row) => row.into_record(),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn clear(&self, older_than: Option<DateTime<Utc>>) -> RepoResult<u64> {
        let deleted = match older_than {
            Some(cutoff) => self.conn.execute(
                "DELETE FROM records WHERE updated_at < ?1;",
                [cutoff_millis(cutoff)],
            )?,
            None => self.conn.execute("DELETE FROM records;", [])?,
        };
        Ok(deleted as u64)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative record count {count}")))
    }
}

/// Rounds `cutoff` up to whole milliseconds. Stored values are whole
/// milliseconds, so `stored < cutoff` holds exactly when
/// `stored < cutoff_millis(cutoff)`.
fn cutoff_millis(cutoff: DateTime<Utc>) -> i64 {
    let partial = cutoff.timestamp_subsec_nanos() % 1_000_000 != 0;
    cutoff.timestamp_millis() + i64::from(partial)
}

/// Raw column values before timestamp decoding.
struct RecordRow {
    id: RecordId,
    name: String,
    url: Option<String>,
    description: Option<String>,
    updated_at_ms: i64,
}

impl RecordRow {
    fn into_record(self) -> RepoResult<Record> {
        let updated_at = DateTime::from_timestamp_millis(self.updated_at_ms).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid updated_at value `{}` in records.updated_at",
                self.updated_at_ms
            ))
        })?;

        Ok(Record {
            id: self.id,
            name: self.name,
            url: self.url,
            description: self.description,
            updated_at,
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get("id")?,
        name: row.get("name")?,
        url: row.get("url")?,
        description: row.get("description")?,
        updated_at_ms: row.get("updated_at")?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<RecordRow>>,
) -> RepoResult<Vec<Record>> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

fn nullable_text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
