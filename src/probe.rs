//! The connectivity probe.
//!
//! connect -> identity query -> count query -> release, strictly in sequence.
//! The first failure short-circuits the remaining steps; the connection is
//! released on every path before `run` returns.

use crate::db::{ConnectionGuard, OpenConnections};
use crate::error::{ProbeError, ProbeResult};
use crate::models::{ConnectionConfig, ProbeReport, ServerIdentity};
use tracing::{error, info};

pub const DEFAULT_TABLE: &str = "customers";

/// Progress hooks invoked by `ConnectivityProbe::run`.
///
/// All hooks default to no-ops so implementors only override what they render.
pub trait ProbeObserver {
    fn connecting(&mut self, _config: &ConnectionConfig) {}

    fn connected(&mut self) {}

    fn identity(&mut self, _identity: &ServerIdentity) {}

    fn row_count(&mut self, _table: &str, _count: i64) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl ProbeObserver for SilentObserver {}

#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    table: String,
    open: OpenConnections,
}

impl ConnectivityProbe {
    /// Create a probe that counts the `customers` table.
    pub fn new() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            open: OpenConnections::new(),
        }
    }

    /// Count `table` instead of `customers`.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Connections opened by this probe that are still held.
    pub fn open_connections(&self) -> usize {
        self.open.count()
    }

    /// Run the probe without progress reporting.
    pub async fn probe(&self, config: &ConnectionConfig) -> ProbeResult {
        self.run(config, &mut SilentObserver).await
    }

    /// Run the probe, notifying `observer` as each step completes.
    pub async fn run(
        &self,
        config: &ConnectionConfig,
        observer: &mut dyn ProbeObserver,
    ) -> ProbeResult {
        info!(
            target_url = %config.masked_url(),
            timeout = ?config.connect_timeout,
            "Connecting to database"
        );
        observer.connecting(config);

        let mut guard = ConnectionGuard::open(config, &self.open)
            .await
            .inspect_err(|e| error!(error = %e, code = ?e.code(), "Probe failed"))?;
        observer.connected();

        let outcome = self.query(&mut guard, observer).await;
        guard.release().await;

        match &outcome {
            Ok(report) => info!(
                user = %report.current_user(),
                database = %report.current_database(),
                count = report.customer_count,
                "Probe succeeded"
            ),
            Err(e) => error!(error = %e, code = ?e.code(), "Probe failed"),
        }
        outcome
    }

    async fn query(
        &self,
        guard: &mut ConnectionGuard,
        observer: &mut dyn ProbeObserver,
    ) -> Result<ProbeReport, ProbeError> {
        let identity = guard.fetch_identity().await?;
        observer.identity(&identity);

        let customer_count = guard.count_rows(&self.table).await?;
        observer.row_count(&self.table, customer_count);

        Ok(ProbeReport {
            identity,
            customer_count,
        })
    }
}

impl Default for ConnectivityProbe {
    fn default() -> Self {
        Self::new()
    }
}
