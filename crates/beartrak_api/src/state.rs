//! Shared handler state and the per-request storage session.

use crate::error::ApiError;
use beartrak_core::{Database, RecordService, ServiceError, SqliteRecordStore, TransportOptions};
use log::warn;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    db: Database,
    options: TransportOptions,
}

impl AppState {
    pub fn new(db: Database, options: TransportOptions) -> Self {
        Self { db, options }
    }

    /// Runs `op` against a record service bound to a freshly acquired storage
    /// session on the blocking pool. The session is released when `op`
    /// returns or unwinds.
    pub(crate) async fn with_service<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'s> FnOnce(&RecordService<SqliteRecordStore<'s>>) -> Result<T, ServiceError>
            + Send
            + 'static,
    {
        let db = self.db.clone();
        let options = self.options;
        tokio::task::spawn_blocking(move || -> Result<T, ServiceError> {
            let session = db.session()?;
            let service = RecordService::new(SqliteRecordStore::new(&session), options);
            op(&service)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
        .map_err(ApiError::from)
    }

    /// Returns whether the storage connectivity probe succeeded.
    pub(crate) async fn probe_storage(&self) -> bool {
        let db = self.db.clone();
        match tokio::task::spawn_blocking(move || db.probe()).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!("event=health_probe module=api status=error error={err}");
                false
            }
            Err(err) => {
                warn!("event=health_probe module=api status=error error={err}");
                false
            }
        }
    }
}
