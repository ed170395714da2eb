//! Configuration handling for pg-probe.
//!
//! This module provides configuration management via CLI arguments and environment
//! variables. Connection settings honour the usual libpq variables (PGHOST, PGPORT, ...).

use crate::models::{ConnectionConfig, ConnectionConfigError, DEFAULT_PORT, SslMode};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_DATABASE: &str = "northwind";
pub const DEFAULT_USER: &str = "northwind";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for pg-probe.
#[derive(Clone, Parser)]
#[command(
    name = "pg-probe",
    about = "Check that a PostgreSQL server is reachable and the customers table is readable",
    version,
    author
)]
pub struct Config {
    /// Database server host
    #[arg(long, default_value = DEFAULT_HOST, env = "PGHOST")]
    pub host: String,

    /// Database server port
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PGPORT")]
    pub port: u16,

    /// Database name
    #[arg(short, long, default_value = DEFAULT_DATABASE, env = "PGDATABASE")]
    pub database: String,

    /// Database user
    #[arg(short = 'U', long, default_value = DEFAULT_USER, env = "PGUSER")]
    pub user: String,

    /// Database password. No default: unlike database and user, the password is
    /// never baked in and must come from --password or PGPASSWORD
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "PROBE_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// TLS mode (disable, prefer, require)
    #[arg(long, value_enum, default_value = "prefer", env = "PGSSLMODE")]
    pub sslmode: SslMode,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "PROBE_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "PROBE_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output on stderr (disabled by default to keep the report readable)
    #[arg(long, env = "PROBE_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            user: DEFAULT_USER.to_string(),
            password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            sslmode: SslMode::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Build the validated connection configuration.
    pub fn connection_config(&self) -> Result<ConnectionConfig, ConnectionConfigError> {
        let mut config = ConnectionConfig::new(&self.host, &self.database, &self.user)?
            .with_port(self.port)
            .with_connect_timeout(self.connect_timeout_duration())
            .with_ssl_mode(self.sslmode);
        if let Some(password) = &self.password {
            config = config.with_password(password);
        }
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("connect_timeout", &self.connect_timeout)
            .field("sslmode", &self.sslmode)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .field("enable_logs", &self.enable_logs)
            .finish()
    }
}
