//! Record domain model.
//!
//! # Responsibility
//! - Define the single persisted entity kind and its write inputs.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `RecordId`.
//! - Deletion is a hard delete; identifiers are never reused.

pub mod record;
