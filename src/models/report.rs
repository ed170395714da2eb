//! Probe outcome models.

/// Session identity as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub current_user: String,
    pub current_database: String,
    /// Raw `version()` output, e.g. "PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by gcc ..."
    pub server_version: String,
}

impl ServerIdentity {
    /// The version string up to (not including) the first comma.
    pub fn version_summary(&self) -> &str {
        version_summary(&self.server_version)
    }
}

impl From<(String, String, String)> for ServerIdentity {
    fn from((current_user, current_database, server_version): (String, String, String)) -> Self {
        Self {
            current_user,
            current_database,
            server_version,
        }
    }
}

/// Successful probe outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub identity: ServerIdentity,
    /// Rows in the probed table at query time
    pub customer_count: i64,
}

impl ProbeReport {
    pub fn current_user(&self) -> &str {
        &self.identity.current_user
    }

    pub fn current_database(&self) -> &str {
        &self.identity.current_database
    }

    pub fn server_version(&self) -> &str {
        &self.identity.server_version
    }
}

/// Substring of `raw` preceding the first comma, or all of it when there is none.
pub fn version_summary(raw: &str) -> &str {
    raw.split_once(',').map_or(raw, |(head, _)| head)
}
