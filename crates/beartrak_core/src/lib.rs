//! Core domain logic for the BearTrak search service.
//! This crate owns record storage, validation and the search/CRUD use cases.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{
    AppConfig, ConfigError, ConfigOverrides, Environment, LogConfig, ServerConfig, StorageConfig,
    StorageLocation,
};
pub use db::{Database, DbError, Session};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{NewRecord, Record, RecordId, RecordPatch, RecordValidationError};
pub use repo::record_repo::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use service::record_service::{
    ClearOutcome, RecordService, RecordView, ServiceError, TransportOptions,
};
pub use service::seed::{sample_records, seed_database};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
