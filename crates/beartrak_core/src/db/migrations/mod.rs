//! Versioned schema scripts for the records database.
//!
//! The applied version lives in `PRAGMA user_version`; pending scripts run
//! together in one transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema scripts indexed by position; script `i` upgrades to version `i + 1`.
const SCHEMA_SCRIPTS: &[&str] = &[include_str!("0001_init.sql")];

/// Returns the newest schema version this binary can open.
pub fn latest_version() -> u32 {
    SCHEMA_SCRIPTS.len() as u32
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for script in &SCHEMA_SCRIPTS[current_version as usize..] {
        tx.execute_batch(script)?;
    }
    tx.execute_batch(&format!("PRAGMA user_version = {latest};"))?;
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={current_version} to_version={latest}");
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
