//! Record model and write-input validation.
//!
//! # Invariants
//! - `name` holds 1..=255 characters.
//! - `url`, when present, holds at most 2048 characters.
//! - `updated_at` never moves backwards for a given `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned primary key.
pub type RecordId = i64;

pub const NAME_MAX_CHARS: usize = 255;
pub const URL_MAX_CHARS: usize = 2048;

/// Canonical stored record (one RFP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub url: Option<String>,
    /// Searchable free text; not always exposed to clients.
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewRecord {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl NewRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks field limits before any storage work.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_name(&self.name)?;
        validate_url(self.url.as_deref())
    }
}

/// Partial update. Outer `None` leaves a field untouched; for the nullable
/// fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub url: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl RecordPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns whether no field is supplied. An empty patch still refreshes
    /// `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none() && self.description.is_none()
    }

    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_url(self.url.as_ref().and_then(Option::as_deref))
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    EmptyName,
    NameTooLong { chars: usize },
    UrlTooLong { chars: usize },
}

impl RecordValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::UrlTooLong { .. } => "url",
        }
    }
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "name has {chars} characters; at most {NAME_MAX_CHARS} allowed"
            ),
            Self::UrlTooLong { chars } => write!(
                f,
                "url has {chars} characters; at most {URL_MAX_CHARS} allowed"
            ),
        }
    }
}

impl Error for RecordValidationError {}

fn validate_name(name: &str) -> Result<(), RecordValidationError> {
    let chars = name.chars().count();
    if chars == 0 {
        return Err(RecordValidationError::EmptyName);
    }
    if chars > NAME_MAX_CHARS {
        return Err(RecordValidationError::NameTooLong { chars });
    }
    Ok(())
}

fn validate_url(url: Option<&str>) -> Result<(), RecordValidationError> {
    let chars = url.map_or(0, |url| url.chars().count());
    if chars > URL_MAX_CHARS {
        return Err(RecordValidationError::UrlTooLong { chars });
    }
    Ok(())
}
