pub mod alerts;
pub mod health;
pub mod readings;
pub mod sessions;
pub mod stats;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scanguard_core::{ServiceError, StorageMode};
use scanguard_sql::{SQLConnection, SQLGateway};
use scanguard_store::storage_err;

use crate::config::RadarConfig;
use crate::fallback::FallbackStore;
use crate::schema::SCHEMA;

/// Radar service: owns the database gateway, the fallback buffer and the
/// module settings. Handlers call into it synchronously.
pub struct RadarService {
    gateway: Option<Arc<dyn SQLGateway>>,
    mode: StorageMode,
    pub(crate) fallback: FallbackStore,
    pub(crate) config: RadarConfig,
    environment: String,
    schema_ready: AtomicBool,
}

/// Where a request's reading data lives.
pub(crate) enum Backend {
    Sql(Box<dyn SQLConnection>),
    Memory,
}

impl RadarService {
    pub fn new(
        gateway: Option<Arc<dyn SQLGateway>>,
        mode: StorageMode,
        config: RadarConfig,
        environment: impl Into<String>,
    ) -> Self {
        let fallback = FallbackStore::new(config.fallback_capacity);
        Self {
            gateway,
            mode,
            fallback,
            config,
            environment: environment.into(),
            schema_ready: AtomicBool::new(false),
        }
    }

    /// A service that never touches a database.
    pub fn in_memory(config: RadarConfig) -> Self {
        Self::new(None, StorageMode::Memory, config, "development")
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    // ── Connections ──

    /// Open a transaction on the durable store.
    ///
    /// Fails with `Unavailable` in memory mode or when the store cannot
    /// be opened. Tables are created on the first successful connection.
    pub(crate) fn connect(&self) -> Result<Box<dyn SQLConnection>, ServiceError> {
        if !self.mode.uses_database() {
            return Err(ServiceError::Unavailable("durable store disabled in memory mode".into()));
        }
        let gateway = self
            .gateway
            .as_ref()
            .ok_or_else(|| ServiceError::Unavailable("no database configured".into()))?;
        self.ensure_schema(gateway.as_ref())?;
        gateway.connect().map_err(storage_err)
    }

    /// Pick the backend for reading endpoints that may run from memory.
    pub(crate) fn backend(&self) -> Result<Backend, ServiceError> {
        match self.mode {
            StorageMode::Memory => Ok(Backend::Memory),
            StorageMode::Database => self.connect().map(Backend::Sql),
            StorageMode::Hybrid => match self.connect() {
                Ok(conn) => Ok(Backend::Sql(conn)),
                Err(ServiceError::Unavailable(msg)) => {
                    tracing::warn!("database unreachable, serving from memory: {}", msg);
                    Ok(Backend::Memory)
                }
                Err(e) => Err(e),
            },
        }
    }

    fn ensure_schema(&self, gateway: &dyn SQLGateway) -> Result<(), ServiceError> {
        if self.schema_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        let mut conn = gateway.connect().map_err(storage_err)?;
        conn.exec_batch(SCHEMA).map_err(storage_err)?;
        conn.commit().map_err(storage_err)?;
        self.schema_ready.store(true, Ordering::Release);
        tracing::info!("radar schema ready");
        Ok(())
    }
}

pub(crate) fn commit(conn: Box<dyn SQLConnection>) -> Result<(), ServiceError> {
    conn.commit().map_err(storage_err)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn memory_mode_refuses_connections() {
        let service = RadarService::in_memory(RadarConfig::default());
        let err = service.connect().err().unwrap();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
        assert!(matches!(service.backend().unwrap(), Backend::Memory));
    }

    #[test]
    fn hybrid_falls_back_when_unreachable() {
        let service = unreachable_service(StorageMode::Hybrid);
        assert!(matches!(service.backend().unwrap(), Backend::Memory));
    }

    #[test]
    fn database_mode_surfaces_unavailable() {
        let service = unreachable_service(StorageMode::Database);
        let err = service.backend().err().unwrap();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn schema_created_on_first_connect() {
        let dir = tempfile::tempdir().unwrap();
        let service = sqlite_service(&dir, StorageMode::Database, RadarConfig::default());
        let mut conn = service.connect().unwrap();
        let rows = conn
            .query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name", &[])
            .unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r.get_str("name")).collect();
        assert!(names.contains(&"readings"));
        assert!(names.contains(&"sessions"));
        assert!(names.contains(&"alerts"));
    }
}
