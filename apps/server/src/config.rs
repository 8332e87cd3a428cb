//! Server configuration.
//!
//! Layered with the `config` crate, later sources win:
//!
//! 1. Built-in defaults
//! 2. `stockroom.toml` (or the file named by `STOCKROOM_CONFIG`), optional
//! 3. `STOCKROOM_*` environment variables (`STOCKROOM_PORT=8080`)

use std::env;
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use stockroom_core::IdScheme;
use stockroom_db::DbConfig;

/// Config file read when `STOCKROOM_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "stockroom.toml";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Where uploaded product photos are written
    pub uploads_dir: PathBuf,

    /// Frontend files served at `/`, if any
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Identifier scheme for stock movements
    pub id_scheme: IdScheme,

    /// Allow cross-origin requests from any origin
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: PathBuf::from("./data/stockroom.db"),
            max_connections: 10,
            uploads_dir: PathBuf::from("./uploads"),
            static_dir: None,
            id_scheme: IdScheme::Sequential,
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the default file location and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var("STOCKROOM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&file)
    }

    /// Loads configuration using `path` as the optional TOML layer.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let settings = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default(
                "database_path",
                defaults.database_path.to_string_lossy().into_owned(),
            )?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default(
                "uploads_dir",
                defaults.uploads_dir.to_string_lossy().into_owned(),
            )?
            .set_default("id_scheme", "sequential")?
            .set_default("cors_allow_any", defaults.cors_allow_any)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("STOCKROOM").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue("host".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.uploads_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("uploads_dir".to_string()));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .id_scheme(self.id_scheme)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.id_scheme, IdScheme::Sequential);
        assert!(config.static_dir.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 8088\nid_scheme = \"random\"\nstatic_dir = \"./public\"\ncors_allow_any = false"
        )
        .unwrap();

        let config = ServerConfig::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.id_scheme, IdScheme::Random);
        assert_eq!(config.static_dir, Some(PathBuf::from("./public")));
        assert!(!config.cors_allow_any);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_rejects_zero_pool_size() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "max_connections = 0").unwrap();

        let err = ServerConfig::load_from(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "max_connections"));
    }

    #[test]
    fn test_db_config_carries_pool_and_scheme() {
        let config = ServerConfig {
            max_connections: 4,
            id_scheme: IdScheme::Random,
            ..ServerConfig::default()
        };
        let db = config.db_config();
        assert_eq!(db.max_connections, 4);
        assert_eq!(db.id_scheme, IdScheme::Random);
        assert!(!db.is_in_memory());
    }
}
