//! Server configuration loaded from TOML
//!
//! Every section is optional and falls back to its defaults:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [database]
//! host = "sql01"
//! database = "Banca"
//! username = "procgate"
//!
//! [pool]
//! max_size = 20
//!
//! [procedures]
//! allowed = ["sp_ConsultarBanco", "sp_CrearDeposito"]
//!
//! [logging]
//! filter = "info"
//! json = true
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use procgate_connection::{HealthThresholds, PoolConfig};
use procgate_driver_mssql::MssqlConfig;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Full server configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: MssqlConfig,
    pub pool: PoolConfig,
    pub procedures: ProceduresConfig,
    pub logging: LoggingConfig,
    pub health: HealthThresholds,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind: SocketAddr,
    /// Largest accepted request body
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// Procedures that may be invoked
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProceduresConfig {
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub filter: String,
    /// Emit JSON lines on the console instead of pretty output
    pub json: bool,
    /// Also write daily-rotated JSON log files here
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,procgate_server=info,procgate_services=info,procgate_connection=info,procgate_driver_mssql=info".to_string(),
            json: false,
            directory: None,
        }
    }
}

impl AppConfig {
    /// Read, parse and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate config text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self
            .procedures
            .allowed
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "procedures.allowed[{}] is blank",
                pos
            )));
        }

        self.pool
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.body_limit_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
