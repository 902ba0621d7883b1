use scanguard_core::{ServiceError, StorageMode, now_rfc3339};
use scanguard_store::storage_err;

use crate::model::{Health, Status};

use super::RadarService;

impl RadarService {
    /// Run a trivial query against the durable store.
    pub fn probe(&self) -> Result<(), ServiceError> {
        let mut conn = self.connect()?;
        conn.query("SELECT 1", &[]).map_err(storage_err)?;
        Ok(())
    }

    /// Always succeeds; a failing probe is reported in `database`.
    pub fn health(&self) -> Health {
        let database = match self.mode() {
            StorageMode::Memory => "memory".to_string(),
            _ => match self.probe() {
                Ok(()) => "connected".to_string(),
                Err(e) => {
                    tracing::warn!("health probe failed: {}", e);
                    format!("error: {}", e.public_message())
                }
            },
        };
        Health {
            status: "healthy",
            service: "ScanGuard API",
            timestamp: now_rfc3339(),
            database,
            environment: self.environment().to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Which backend is serving reading data right now.
    pub fn status(&self) -> Status {
        let database = match self.mode() {
            StorageMode::Memory => "memory",
            _ => match self.probe() {
                Ok(()) => "connected",
                Err(_) if self.mode() == StorageMode::Hybrid => "memory",
                Err(_) => "disconnected",
            },
        };
        Status {
            status: "online",
            database,
            mode: self.mode().as_str(),
            timestamp: now_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RadarConfig;
    use crate::service::testing::*;

    #[test]
    fn healthy_database() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());
        let health = service.health();
        assert_eq!(health.database, "connected");
        assert_eq!(health.environment, "test");
        assert_eq!(service.status().database, "connected");
    }

    #[test]
    fn degraded_database_is_reported_not_raised() {
        let service = unreachable_service(StorageMode::Database);
        let health = service.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.database, "error: database unavailable");
        assert_eq!(service.status().database, "disconnected");
    }

    #[test]
    fn hybrid_reports_memory_when_degraded() {
        let service = unreachable_service(StorageMode::Hybrid);
        assert_eq!(service.status().database, "memory");
        assert_eq!(service.status().mode, "hybrid");
    }

    #[test]
    fn memory_mode_never_probes() {
        let service = RadarService::in_memory(RadarConfig::default());
        assert_eq!(service.health().database, "memory");
        assert_eq!(service.status().database, "memory");
    }
}
