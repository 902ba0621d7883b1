//! Route registration: collects module routes + the dashboard.

use axum::http::{Method, Uri, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Router, middleware};
use scanguard_core::ServiceError;

use crate::cors;

/// Build the complete router.
///
/// Module routes are mounted under `/api`; the dashboard is served at `/`.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut api = Router::new();
    for (name, router) in module_routes {
        tracing::debug!("mounting module '{}' under /api", name);
        api = api.merge(router);
    }

    Router::new()
        .route("/", get(dashboard_page))
        .route("/dashboard.js", get(dashboard_script))
        .nest("/api", api)
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(middleware::from_fn(cors::cors_middleware))
}

async fn dashboard_page() -> impl IntoResponse {
    Html(include_str!("web/dashboard.html"))
}

async fn dashboard_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        include_str!("web/dashboard.js"),
    )
}

/// Unknown paths, and known paths with an unsupported method.
async fn not_found(method: Method, uri: Uri) -> ServiceError {
    ServiceError::NotFound(format!("no route for {method} {}", uri.path()))
}
