//! Radar module: reading ingest, sessions, alerts and statistics.

pub mod api;
pub mod config;
pub mod fallback;
pub mod model;
pub mod schema;
pub mod service;

use std::sync::Arc;

use axum::Router;
use scanguard_core::Module;

pub use config::RadarConfig;
use service::RadarService;

/// Radar module: mounts every reading, session, alert and health route.
pub struct RadarModule {
    service: Arc<RadarService>,
}

impl RadarModule {
    pub fn new(service: RadarService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<RadarService> {
        &self.service
    }
}

impl Module for RadarModule {
    fn name(&self) -> &str {
        "radar"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
