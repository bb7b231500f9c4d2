//! Record HTTP routes.
//!
//! Binds verbs and paths to record service calls and picks the response
//! representation (JSON or HTML fragment).

use crate::error::{ApiError, FieldError};
use crate::html::render_search_results;
use crate::state::AppState;
use crate::SERVICE_NAME;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use beartrak_core::{core_version, ClearOutcome, NewRecord, RecordId, RecordPatch, RecordView};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRecordRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// All fields optional. For `url` and `description`, an explicit `null`
/// clears the value while an absent key leaves it unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ClearParams {
    pub older_than: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database_status: String,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ==================
// Router
// ==================

/// Root, health and record routes, without transport layers.
pub fn record_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/search", post(search_html_handler))
        .route(
            "/api/records",
            get(list_records_handler).post(create_record_handler),
        )
        .route("/api/records/search", get(search_json_handler))
        .route(
            "/api/records/:id",
            get(get_record_handler)
                .put(update_record_handler)
                .delete(delete_record_handler),
        )
        .route("/api/admin/clear", delete(clear_records_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "BearTrak RFP Search API is running" }))
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let storage_ok = state.probe_storage().await;
    let (status_code, status) = if storage_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            service: SERVICE_NAME.to_string(),
            version: core_version().to_string(),
            database_status: if storage_ok { "healthy" } else { "error" }.to_string(),
        }),
    )
}

async fn search_html_handler(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Html<String>, ApiError> {
    let Form(form) = form.map_err(|err| ApiError::invalid("query", err.body_text()))?;
    let query = form
        .query
        .ok_or_else(|| ApiError::invalid("query", "field required"))?;

    let search_text = query.clone();
    let results = state
        .with_service(move |service| service.search(&search_text))
        .await?;

    Ok(Html(render_search_results(&results, &query)))
}

async fn search_json_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::invalid("query", err.body_text()))?;
    let query = params
        .query
        .ok_or_else(|| ApiError::invalid("query", "field required"))?;

    let results = state
        .with_service(move |service| service.search(&query))
        .await?;
    Ok(Json(results))
}

async fn list_records_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    let records = state.with_service(|service| service.list()).await?;
    Ok(Json(records))
}

async fn get_record_handler(
    State(state): State<AppState>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Result<Json<RecordView>, ApiError> {
    let id = record_id(id)?;
    let record = state.with_service(move |service| service.get(id)).await?;
    Ok(Json(record))
}

async fn create_record_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordView>), ApiError> {
    let Json(request) = payload.map_err(body_error)?;
    let name = request
        .name
        .ok_or_else(|| ApiError::invalid("name", "field required"))?;
    let record = NewRecord {
        name,
        url: request.url,
        description: request.description,
    };

    let created = state
        .with_service(move |service| service.create(&record))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record_handler(
    State(state): State<AppState>,
    id: Result<Path<RecordId>, PathRejection>,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> Result<Json<RecordView>, ApiError> {
    let id = record_id(id)?;
    let Json(request) = payload.map_err(body_error)?;
    let patch = RecordPatch {
        name: request.name,
        url: request.url,
        description: request.description,
    };

    let updated = state
        .with_service(move |service| service.update(id, &patch))
        .await?;
    Ok(Json(updated))
}

async fn delete_record_handler(
    State(state): State<AppState>,
    id: Result<Path<RecordId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = record_id(id)?;
    state.with_service(move |service| service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_records_handler(
    State(state): State<AppState>,
    params: Result<Query<ClearParams>, QueryRejection>,
) -> Result<Json<ClearOutcome>, ApiError> {
    let Query(params) =
        params.map_err(|err| ApiError::invalid("older_than", err.body_text()))?;
    let older_than = params
        .older_than
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    let outcome = state
        .with_service(move |service| service.clear(older_than))
        .await?;
    Ok(Json(outcome))
}

// ==================
// Helper Functions
// ==================

fn record_id(id: Result<Path<RecordId>, PathRejection>) -> Result<RecordId, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|err| ApiError::invalid("id", err.body_text()))
}

fn body_error(err: JsonRejection) -> ApiError {
    ApiError::Validation(vec![FieldError::new("body", err.body_text())])
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC) or a bare date
/// (UTC midnight).
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }
    Err(ApiError::invalid(
        "older_than",
        format!("`{raw}` is not a recognized timestamp"),
    ))
}

#[cfg(test)]
mod tests {
    use super::{parse_timestamp, UpdateRecordRequest};
    use chrono::{TimeZone, Utc};

    #[test]
    fn timestamps_parse_in_supported_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-09T08:30:00Z").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-09T10:30:00+02:00").unwrap(),
            expected
        );
        assert_eq!(parse_timestamp("2024-03-09T08:30:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-09").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("last tuesday").is_err());
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let absent: UpdateRecordRequest = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(absent.url, None);

        let cleared: UpdateRecordRequest = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert_eq!(cleared.url, Some(None));

        let set: UpdateRecordRequest =
            serde_json::from_str(r#"{"description": "d"}"#).unwrap();
        assert_eq!(set.description, Some(Some("d".to_string())));
    }
}
