use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Which backend serves reading data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Durable store only. Store failures surface as 500.
    #[default]
    Database,
    /// Durable store, falling back to the in-memory buffer when the
    /// store cannot be reached.
    Hybrid,
    /// In-memory buffer only. The durable store is never contacted.
    Memory,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Hybrid => "hybrid",
            Self::Memory => "memory",
        }
    }

    /// Whether this mode needs a database path to run.
    pub fn uses_database(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(Self::Database),
            "hybrid" => Ok(Self::Hybrid),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown storage mode '{other}'")),
        }
    }
}

/// Common runtime configuration shared by the server and its modules.
///
/// Loaded from the `[service]` table of the config file, then overridden
/// by environment variables (see [`ServiceConfig::apply_env`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address for the HTTP server.
    pub listen: String,

    /// Backend selection for reading data.
    pub mode: StorageMode,

    /// Path to the SQLite database file. No default: durable and hybrid
    /// modes refuse to start without one.
    pub db_path: Option<PathBuf>,

    /// How long a statement waits on a locked database, in seconds.
    pub busy_timeout_secs: u64,

    /// Deployment label reported by the health endpoint.
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            mode: StorageMode::default(),
            db_path: None,
            busy_timeout_secs: 10,
            environment: "development".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Apply environment overrides.
    ///
    /// Supported variables:
    /// - `SCANGUARD_LISTEN`
    /// - `SCANGUARD_DB_MODE` (`database`, `hybrid`, `memory`)
    /// - `SCANGUARD_DB_PATH`
    /// - `SCANGUARD_DB_TIMEOUT` (seconds)
    /// - `SCANGUARD_ENV`
    ///
    /// `lookup` is normally `|k| std::env::var(k).ok()`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("SCANGUARD_LISTEN") {
            self.listen = val;
        }
        if let Some(val) = lookup("SCANGUARD_DB_MODE") {
            self.mode = val.parse()?;
        }
        if let Some(val) = lookup("SCANGUARD_DB_PATH") {
            if !val.is_empty() {
                self.db_path = Some(PathBuf::from(val));
            }
        }
        if let Some(val) = lookup("SCANGUARD_DB_TIMEOUT") {
            self.busy_timeout_secs = val
                .parse()
                .map_err(|_| format!("SCANGUARD_DB_TIMEOUT must be an integer, got '{val}'"))?;
        }
        if let Some(val) = lookup("SCANGUARD_ENV") {
            self.environment = val;
        }
        Ok(())
    }

    /// The configured database path, or an error naming the missing setting.
    pub fn resolve_db_path(&self) -> Result<PathBuf, String> {
        self.db_path.clone().ok_or_else(|| {
            format!(
                "storage mode '{}' requires a database path (service.db_path or SCANGUARD_DB_PATH)",
                self.mode
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_apply_env() {
        let vars = env(&[
            ("SCANGUARD_LISTEN", "127.0.0.1:9090"),
            ("SCANGUARD_DB_MODE", "hybrid"),
            ("SCANGUARD_DB_PATH", "/var/lib/scanguard/radar.sqlite"),
            ("SCANGUARD_DB_TIMEOUT", "3"),
        ]);
        let mut config = ServiceConfig::default();
        config.apply_env(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.listen, "127.0.0.1:9090");
        assert_eq!(config.mode, StorageMode::Hybrid);
        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/scanguard/radar.sqlite"))
        );
        assert_eq!(config.busy_timeout_secs, 3);
    }

    #[test]
    fn test_bad_env_values() {
        let vars = env(&[("SCANGUARD_DB_MODE", "cloud")]);
        let mut config = ServiceConfig::default();
        assert!(config.apply_env(|k| vars.get(k).cloned()).is_err());

        let vars = env(&[("SCANGUARD_DB_TIMEOUT", "soon")]);
        let mut config = ServiceConfig::default();
        assert!(config.apply_env(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_no_default_db_path() {
        let config = ServiceConfig::default();
        assert!(config.db_path.is_none());
        assert!(config.resolve_db_path().is_err());
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("DB".parse::<StorageMode>().unwrap(), StorageMode::Database);
        assert_eq!("memory".parse::<StorageMode>().unwrap(), StorageMode::Memory);
        assert!(!StorageMode::Memory.uses_database());
        assert!(StorageMode::Hybrid.uses_database());
    }
}
