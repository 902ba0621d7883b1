use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::model::{Health, Status};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
}

/// Always 200; a degraded store shows up in the `database` field.
async fn health(State(svc): State<AppState>) -> Json<Health> {
    Json(svc.health())
}

async fn status(State(svc): State<AppState>) -> Json<Status> {
    Json(svc.status())
}
