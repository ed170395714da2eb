//! Connection-related data models.
//!
//! This module defines the configuration of the single connection a probe opens.

use clap::ValueEnum;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_APPLICATION_NAME: &str = "pg-probe";

/// TLS negotiation mode for the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SslMode {
    /// Never use TLS
    Disable,
    /// Use TLS if the server supports it
    #[default]
    Prefer,
    /// Fail unless TLS can be negotiated
    Require,
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
        }
    }
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disable => write!(f, "disable"),
            Self::Prefer => write!(f, "prefer"),
            Self::Require => write!(f, "require"),
        }
    }
}

/// Configuration for the probe connection.
///
/// Built once at startup and never mutated afterwards. `Debug` is implemented
/// by hand so the password cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// Contains sensitive data - never log
    pub password: Option<String>,
    /// Upper bound on establishing the connection (TCP, TLS and authentication)
    pub connect_timeout: Duration,
    pub ssl_mode: SslMode,
    /// Reported to the server, visible in pg_stat_activity
    pub application_name: String,
}

impl ConnectionConfig {
    /// Create a validated configuration with default port, timeout and TLS mode.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<Self, ConnectionConfigError> {
        let config = Self {
            host: host.into(),
            port: DEFAULT_PORT,
            database: database.into(),
            user: user.into(),
            password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ssl_mode: SslMode::default(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_ssl_mode(mut self, ssl_mode: SslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Check the invariants the builder methods cannot enforce on their own.
    pub fn validate(&self) -> Result<(), ConnectionConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConnectionConfigError::Empty("host"));
        }
        if self.database.trim().is_empty() {
            return Err(ConnectionConfigError::Empty("database"));
        }
        if self.user.trim().is_empty() {
            return Err(ConnectionConfigError::Empty("user"));
        }
        if self.port == 0 {
            return Err(ConnectionConfigError::InvalidPort);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConnectionConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Get a display-safe connection URL (credentials masked).
    pub fn masked_url(&self) -> String {
        let secret = if self.password.is_some() { ":****" } else { "" };
        format!(
            "postgres://{}{}@{}:{}/{}",
            self.user, secret, self.host, self.port, self.database
        )
    }

    /// Driver options for a single connection.
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .ssl_mode(self.ssl_mode.into())
            .application_name(&self.application_name);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("connect_timeout", &self.connect_timeout)
            .field("ssl_mode", &self.ssl_mode)
            .field("application_name", &self.application_name)
            .finish()
    }
}

/// Errors that can occur when creating a connection configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionConfigError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("port must be between 1 and 65535")]
    InvalidPort,

    #[error("connect timeout must be greater than zero")]
    ZeroTimeout,
}
