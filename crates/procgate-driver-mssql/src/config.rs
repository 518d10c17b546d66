//! SQL Server connection settings

use std::time::Duration;

use serde::Deserialize;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1433
}

fn default_schema() -> String {
    "dbo".to_string()
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

/// Settings used to open SQL Server connections
#[derive(Clone, Deserialize)]
pub struct MssqlConfig {
    /// Server hostname
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name
    #[serde(default)]
    pub database: Option<String>,
    /// SQL Server login
    #[serde(default)]
    pub username: Option<String>,
    /// SQL Server password
    #[serde(default)]
    pub password: Option<String>,
    /// Trust the server certificate without validation (development only)
    #[serde(default)]
    pub trust_cert: bool,
    /// Schema used for procedure names that carry none
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Upper bound for a single procedure call, in milliseconds
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl MssqlConfig {
    /// Create settings for the given host with defaults everywhere else
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Command timeout as a Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for MssqlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: None,
            username: None,
            password: None,
            trust_cert: false,
            schema: default_schema(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl std::fmt::Debug for MssqlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("trust_cert", &self.trust_cert)
            .field("schema", &self.schema)
            .field("command_timeout_ms", &self.command_timeout_ms)
            .finish()
    }
}
