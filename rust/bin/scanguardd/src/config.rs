//! Server configuration file.
//!
//! ```toml
//! [service]
//! listen = "0.0.0.0:8080"
//! mode = "hybrid"
//! db_path = "/var/lib/scanguard/radar.db"
//!
//! [radar]
//! retention = 1000
//! ```

use std::path::{Path, PathBuf};

use radar::RadarConfig;
use scanguard_core::ServiceConfig;
use serde::Deserialize;

/// Directory searched when `-c` names a context instead of a file.
pub const CONFIG_DIR: &str = "/etc/scanguard";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub radar: RadarConfig,
}

impl ServerConfig {
    /// A context name resolves to `/etc/scanguard/<name>.toml`; anything
    /// containing `/` or `.` is used as a path.
    pub fn resolve_path(name: &str) -> PathBuf {
        if name.contains('/') || name.contains('.') {
            PathBuf::from(name)
        } else {
            Path::new(CONFIG_DIR).join(format!("{name}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `SCANGUARD_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.service
            .apply_env(|k| std::env::var(k).ok())
            .map_err(|e| anyhow::anyhow!(e))
    }
}
