//! Record use-case service.
//!
//! # Responsibility
//! - Provide search and CRUD entry points for the request surface.
//! - Translate repository results into [`RecordView`] and [`ServiceError`].
//!
//! # Invariants
//! - Search text shorter than two trimmed characters never reaches the store.
//! - The service holds no state besides its store and transport options.

use crate::db::DbError;
use crate::model::record::{NewRecord, Record, RecordId, RecordPatch, RecordValidationError};
use crate::repo::record_repo::{RecordStore, RepoError, MIN_SEARCH_CHARS};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for record use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before touching storage.
    Validation(RecordValidationError),
    /// Target record does not exist.
    NotFound(RecordId),
    /// Persistence-layer failure.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(value: DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

/// Controls which fields leave the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub expose_description: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            expose_description: true,
        }
    }
}

/// Record shape exposed to external callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub name: String,
    pub url: Option<String>,
    /// Omitted when hidden by [`TransportOptions`] or unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl RecordView {
    pub fn from_record(record: Record, options: TransportOptions) -> Self {
        Self {
            id: record.id,
            name: record.name,
            url: record.url,
            description: record
                .description
                .filter(|_| options.expose_description),
            updated_at: record.updated_at,
        }
    }
}

/// Result of a bulk clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    pub deleted_count: u64,
    pub message: String,
}

/// Record service facade over a store implementation.
pub struct RecordService<R: RecordStore> {
    store: R,
    options: TransportOptions,
}

impl<R: RecordStore> RecordService<R> {
    pub fn new(store: R, options: TransportOptions) -> Self {
        Self { store, options }
    }

    /// Searches names and descriptions for `query` as a substring.
    pub fn search(&self, query: &str) -> Result<Vec<RecordView>, ServiceError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        let records = self.store.search(trimmed)?;
        Ok(self.views(records))
    }

    pub fn create(&self, record: &NewRecord) -> Result<RecordView, ServiceError> {
        let created = self.store.insert(record)?;
        info!(
            "event=record_create module=service status=ok record_id={}",
            created.id
        );
        Ok(self.view(created))
    }

    pub fn get(&self, id: RecordId) -> Result<RecordView, ServiceError> {
        self.store
            .get(id)?
            .map(|record| self.view(record))
            .ok_or(ServiceError::NotFound(id))
    }

    /// Lists every record ordered by name.
    pub fn list(&self) -> Result<Vec<RecordView>, ServiceError> {
        let records = self.store.list_all()?;
        Ok(self.views(records))
    }

    pub fn update(&self, id: RecordId, patch: &RecordPatch) -> Result<RecordView, ServiceError> {
        let updated = self.store.update(id, patch)?;
        Ok(self.view(updated))
    }

    pub fn delete(&self, id: RecordId) -> Result<(), ServiceError> {
        if !self.store.delete(id)? {
            return Err(ServiceError::NotFound(id));
        }
        info!("event=record_delete module=service status=ok record_id={id}");
        Ok(())
    }

    /// Deletes all records, or only those last updated before `older_than`.
    pub fn clear(&self, older_than: Option<DateTime<Utc>>) -> Result<ClearOutcome, ServiceError> {
        let deleted_count = self.store.clear(older_than)?;
        let message = match older_than {
            Some(cutoff) => format!(
                "Database cleared successfully. Deleted {deleted_count} records older than {}.",
                cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            None => format!("Database cleared successfully. Deleted {deleted_count} records."),
        };
        info!(
            "event=records_clear module=service status=ok deleted_count={} bounded={}",
            deleted_count,
            older_than.is_some()
        );
        Ok(ClearOutcome {
            deleted_count,
            message,
        })
    }

    /// Inserts `samples` only when the store holds no records.
    ///
    /// Returns how many records were inserted.
    pub fn seed_if_empty(&self, samples: &[NewRecord]) -> Result<usize, ServiceError> {
        if self.store.count()? > 0 {
            return Ok(0);
        }
        for sample in samples {
            self.store.insert(sample)?;
        }
        info!(
            "event=records_seed module=service status=ok inserted={}",
            samples.len()
        );
        Ok(samples.len())
    }

    fn view(&self, record: Record) -> RecordView {
        RecordView::from_record(record, self.options)
    }

    fn views(&self, records: Vec<Record>) -> Vec<RecordView> {
        records.into_iter().map(|record| self.view(record)).collect()
    }
}
