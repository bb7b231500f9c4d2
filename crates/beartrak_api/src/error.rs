//! HTTP error taxonomy and JSON error bodies.
//!
//! # Invariants
//! - Validation failures answer 422 with field-level detail.
//! - Unknown identifiers answer 404, never 422.
//! - Storage faults answer 500 with a generic message and are logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use beartrak_core::ServiceError;
use log::error;
use serde::{Deserialize, Serialize};

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    NotFound,
    Storage(String),
    Internal(String),
}

impl ApiError {
    /// Single-field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::invalid(err.field(), err.to_string()),
            ServiceError::NotFound(_) => Self::NotFound,
            ServiceError::Storage(err) => Self::Storage(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    detail: "validation failed".to_string(),
                    errors,
                },
            ),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    detail: "RFP not found".to_string(),
                    errors: Vec::new(),
                },
            ),
            Self::Storage(message) => {
                error!("event=request_failed module=api status=error error_code=storage error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        detail: "internal storage error".to_string(),
                        errors: Vec::new(),
                    },
                )
            }
            Self::Internal(message) => {
                error!("event=request_failed module=api status=error error_code=internal error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        detail: "internal server error".to_string(),
                        errors: Vec::new(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beartrak_core::{RecordValidationError, RepoError};

    #[test]
    fn service_errors_map_to_distinct_variants() {
        let validation = ApiError::from(ServiceError::Validation(RecordValidationError::EmptyName));
        assert!(matches!(&validation, ApiError::Validation(errors) if errors[0].field == "name"));

        let missing = ApiError::from(ServiceError::NotFound(3));
        assert!(matches!(missing, ApiError::NotFound));

        let storage = ApiError::from(ServiceError::Storage(RepoError::InvalidData("x".into())));
        assert!(matches!(storage, ApiError::Storage(_)));
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            ApiError::invalid("name", "empty").into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage("disk".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
