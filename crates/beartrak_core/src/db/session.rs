//! Shared database handle and scoped per-request sessions.

use super::{open_storage, DbError, DbResult};
use crate::config::StorageConfig;
use rusqlite::Connection;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle over one migrated SQLite connection.
///
/// SQLite is a single-writer engine, so callers take turns through
/// [`Database::session`]; the returned guard releases the connection on drop.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Exclusive access to the connection for the duration of one request.
pub struct Session<'db> {
    guard: MutexGuard<'db, Connection>,
}

impl Database {
    /// Opens storage from explicit configuration.
    pub fn open(config: &StorageConfig) -> DbResult<Self> {
        open_storage(config).map(Self::from_connection)
    }

    /// Opens a fresh in-memory database with migrations applied.
    pub fn open_in_memory() -> DbResult<Self> {
        super::open_db_in_memory().map(Self::from_connection)
    }

    /// Wraps an already bootstrapped connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Acquires the storage session.
    pub fn session(&self) -> DbResult<Session<'_>> {
        let guard = self.conn.lock().map_err(|_| DbError::SessionPoisoned)?;
        Ok(Session { guard })
    }

    /// Runs a trivial round trip to confirm storage connectivity.
    pub fn probe(&self) -> DbResult<()> {
        let session = self.session()?;
        session.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

impl Deref for Session<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.guard
    }
}
