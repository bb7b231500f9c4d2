//! Sample RFPs inserted into an empty database at startup.

use crate::db::{Database, DbError};
use crate::model::record::NewRecord;
use crate::repo::record_repo::SqliteRecordStore;
use crate::service::record_service::{RecordService, ServiceError, TransportOptions};

/// Seeds `samples` into an empty database inside one transaction.
///
/// Either every sample is stored or none is. Returns how many records were
/// inserted (zero when the table already holds data).
pub fn seed_database(db: &Database, samples: &[NewRecord]) -> Result<usize, ServiceError> {
    let session = db.session()?;
    let tx = session.unchecked_transaction().map_err(DbError::from)?;
    let inserted = RecordService::new(SqliteRecordStore::new(&tx), TransportOptions::default())
        .seed_if_empty(samples)?;
    tx.commit().map_err(DbError::from)?;
    Ok(inserted)
}

/// Returns the built-in sample records.
pub fn sample_records() -> Vec<NewRecord> {
    vec![
        NewRecord::new("Software Development Services")
            .with_url("https://procurement.example.gov/rfp/software-development")
            .with_description(
                "Custom software development for a modern web application with cloud hosting.",
            ),
        NewRecord::new("Digital Marketing Campaign")
            .with_url("https://procurement.example.gov/rfp/digital-marketing")
            .with_description("Social media and search marketing for a regional tourism board."),
        NewRecord::new("University Network Upgrade")
            .with_description("Campus-wide wireless and fiber upgrade for a public university."),
        NewRecord::new("Healthcare Records Migration")
            .with_url("https://procurement.example.gov/rfp/ehr-migration")
            .with_description(
                "Migration of healthcare patient records to a certified EHR platform.",
            ),
        NewRecord::new("Municipal Building Maintenance")
            .with_description("Janitorial and HVAC maintenance for city-owned buildings."),
    ]
}
