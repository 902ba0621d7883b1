pub mod alertas;
pub mod data;
pub mod health;
pub mod leituras;
pub mod sessoes;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::http::{Method, StatusCode, Uri};
use axum::{Json, Router};
use serde::Serialize;

use scanguard_core::ServiceError;

use crate::service::RadarService;

/// Shared application state.
pub type AppState = Arc<RadarService>;

/// Build the radar API router. Paths are relative to `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(data::routes())
        .merge(leituras::routes())
        .merge(sessoes::routes())
        .merge(alertas::routes())
        .merge(health::routes())
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

/// A known path with an unsupported method is answered like an unknown route.
async fn method_not_allowed(method: Method, uri: Uri) -> ServiceError {
    ServiceError::NotFound(format!("no route for {method} {}", uri.path()))
}

/// Decode a JSON request body. Bad JSON is a validation failure.
pub(crate) fn parse_body(body: &Bytes) -> Result<serde_json::Value, ServiceError> {
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::Validation(format!("invalid JSON body: {e}")))
}

/// Unwrap query parameters, turning a rejection into a JSON 400.
pub(crate) fn query<T>(q: Result<Query<T>, QueryRejection>) -> Result<T, ServiceError> {
    q.map(|Query(inner)| inner)
        .map_err(|e| ServiceError::Validation(e.body_text()))
}

pub(crate) fn created<T: Serialize>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}
