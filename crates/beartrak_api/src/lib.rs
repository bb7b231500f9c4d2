//! HTTP request surface for the BearTrak search service.
//!
//! # Responsibility
//! - Map HTTP verbs/paths to record service calls.
//! - Apply transport policy: CORS, request timeout, access logging.
//!
//! # Invariants
//! - Handlers never read process configuration directly; everything they
//!   need arrives through [`AppState`].
//! - Storage work runs on the blocking pool inside a scoped session.

pub mod error;
pub mod html;
pub mod request_log;
pub mod routes;
pub mod state;

pub use error::{ApiError, ErrorResponse, FieldError};
pub use routes::HealthResponse;
pub use state::AppState;

use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::Router;
use beartrak_core::ServerConfig;
use log::warn;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "BearTrak Search API";

/// Builds the complete application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id_header = HeaderName::from_static(request_log::REQUEST_ID_HEADER);

    routes::record_routes(state)
        .layer(middleware::from_fn(request_log::log_requests))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors_layer(config))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("event=cors_origin_skipped module=api status=error origin={origin} error={err}");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
