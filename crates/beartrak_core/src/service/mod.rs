//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into use-case level APIs.
//! - Convert stored records into the transport representation.
//! - Keep the HTTP layer decoupled from storage details.

pub mod record_service;
pub mod seed;
