//! Scoped ownership of the probe's single database connection.

use crate::error::ProbeError;
use crate::models::{ConnectionConfig, ServerIdentity};
use sqlx::{Connection, PgConnection};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

pub const IDENTITY_QUERY: &str = "SELECT current_user, current_database(), version()";

/// Shared count of connections currently held by guards.
#[derive(Debug, Clone, Default)]
pub struct OpenConnections(Arc<AtomicUsize>);

impl OpenConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of guards that have not been released or dropped yet.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> OpenSlot {
        self.0.fetch_add(1, Ordering::SeqCst);
        OpenSlot {
            open: self.clone(),
            released: false,
        }
    }
}

/// One unit of `OpenConnections`, given back on drop.
struct OpenSlot {
    open: OpenConnections,
    released: bool,
}

impl Drop for OpenSlot {
    fn drop(&mut self) {
        self.open.0.fetch_sub(1, Ordering::SeqCst);
        if !self.released {
            warn!("Connection released via Drop - consider using explicit release()");
        }
    }
}

/// RAII guard for the probe connection.
///
/// Call `release().await` to send a graceful Terminate to the server. If the
/// guard is dropped instead (panic, cancelled future) the socket is still
/// closed by `PgConnection`'s own drop and the open count is still decremented.
pub struct ConnectionGuard {
    conn: PgConnection,
    slot: OpenSlot,
}

impl std::fmt::Debug for ConnectionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("released", &self.slot.released)
            .finish_non_exhaustive()
    }
}

impl ConnectionGuard {
    /// Connect within `config.connect_timeout`.
    pub async fn open(
        config: &ConnectionConfig,
        open: &OpenConnections,
    ) -> Result<Self, ProbeError> {
        let options = config.connect_options();
        let attempt = PgConnection::connect_with(&options);

        let conn = match tokio::time::timeout(config.connect_timeout, attempt).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(ProbeError::connect_failed(e)),
            Err(_) => {
                warn!(
                    timeout = ?config.connect_timeout,
                    "Connect attempt timed out"
                );
                return Err(ProbeError::connect_timeout(config.connect_timeout));
            }
        };

        info!(target_url = %config.masked_url(), "Connection established");
        Ok(Self {
            conn,
            slot: open.acquire(),
        })
    }

    /// Fetch the session user, active database and raw server version.
    pub async fn fetch_identity(&mut self) -> Result<ServerIdentity, ProbeError> {
        debug!(sql = IDENTITY_QUERY, "Running identity query");
        let row = sqlx::query_as::<_, (String, String, String)>(IDENTITY_QUERY)
            .fetch_one(&mut self.conn)
            .await
            .map_err(ProbeError::query_failed)?;
        Ok(ServerIdentity::from(row))
    }

    /// Count the rows of `table` in the current schema.
    pub async fn count_rows(&mut self, table: &str) -> Result<i64, ProbeError> {
        let sql = count_query(table);
        debug!(sql = %sql, "Running count query");
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(ProbeError::query_failed)
    }

    /// Close the connection gracefully. Consumes the guard so it runs once.
    pub async fn release(self) {
        let Self { conn, mut slot } = self;
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close connection cleanly");
        }
        slot.released = true;
        debug!("Connection released");
    }
}

/// `SELECT COUNT(*)` over a double-quoted identifier.
pub fn count_query(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
