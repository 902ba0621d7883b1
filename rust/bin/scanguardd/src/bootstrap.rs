//! Bootstrap: startup checks and store wiring.
//!
//! When scanguardd starts:
//! 1. Verify the config: durable modes need an explicit database path.
//! 2. Build the radar service over the configured backend.
//! 3. Probe the store once and log the outcome. A failed probe does not
//!    stop the server.

use std::sync::Arc;
use std::time::Duration;

use radar::service::RadarService;
use scanguard_core::StorageMode;
use scanguard_sql::{SQLGateway, SqliteGateway};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Refuse to start on a config the server cannot run with.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.service.listen.trim().is_empty() {
        anyhow::bail!("service.listen is empty in configuration.");
    }
    if config.service.mode.uses_database() {
        config
            .service
            .resolve_db_path()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    config.radar.validate().map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

/// Build the radar service for the configured storage mode.
pub fn build_service(config: &ServerConfig) -> anyhow::Result<RadarService> {
    let gateway: Option<Arc<dyn SQLGateway>> = match config.service.mode {
        StorageMode::Memory => None,
        _ => {
            let path = config
                .service
                .resolve_db_path()
                .map_err(|e| anyhow::anyhow!(e))?;
            info!("Using SQLite database at {}", path.display());
            Some(Arc::new(SqliteGateway::new(
                path,
                Duration::from_secs(config.service.busy_timeout_secs),
            )))
        }
    };

    Ok(RadarService::new(
        gateway,
        config.service.mode,
        config.radar.clone(),
        config.service.environment.clone(),
    ))
}

/// Log whether the store answers.
pub fn probe_store(service: &RadarService) {
    match service.mode() {
        StorageMode::Memory => info!("Storage mode: memory (durable store disabled)"),
        mode => match service.probe() {
            Ok(()) => info!("Storage mode: {} (database connected)", mode),
            Err(e) if mode == StorageMode::Hybrid => {
                warn!("Storage mode: hybrid, database unreachable, serving from memory: {}", e)
            }
            Err(e) => warn!("Storage mode: database, probe failed: {}", e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_config_requires_db_path() {
        let config = ServerConfig::default();
        assert!(verify_config(&config).is_err());
    }

    #[test]
    fn test_verify_config_memory_needs_no_path() {
        let mut config = ServerConfig::default();
        config.service.mode = StorageMode::Memory;
        assert!(verify_config(&config).is_ok());
        let service = build_service(&config).unwrap();
        assert_eq!(service.mode(), StorageMode::Memory);
    }

    #[test]
    fn test_verify_config_rejects_bad_radar_settings() {
        let mut config = ServerConfig::default();
        config.service.mode = StorageMode::Memory;
        config.radar.retention = 0;
        assert!(verify_config(&config).is_err());
    }

    #[test]
    fn test_build_service_with_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig::default();
        config.service.db_path = Some(dir.path().join("radar.db"));
        verify_config(&config).unwrap();

        let service = build_service(&config).unwrap();
        assert!(service.probe().is_ok());
        probe_store(&service);
    }
}
