//! Human-readable console output for a probe run.
//!
//! Progress and success go to `out`, failures to `err`. Write failures on the
//! console are ignored: the report is cosmetic and must not change the outcome.

use crate::error::{ProbeError, ProbeResult};
use crate::models::{ConnectionConfig, ServerIdentity};
use crate::probe::ProbeObserver;
use std::io::{self, Stderr, Stdout, Write};

pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl ConsoleReporter<Stdout, Stderr> {
    /// Reporter bound to the process stdout/stderr.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Print the final outcome.
    pub fn finish(&mut self, result: &ProbeResult) {
        match result {
            Ok(_) => {
                let _ = writeln!(self.out, "PostgreSQL connection is working correctly");
                let _ = self.out.flush();
            }
            Err(e) => self.failure(e),
        }
    }

    // Connection and query failures share one handler.
    fn failure(&mut self, error: &ProbeError) {
        let _ = writeln!(self.err, "Connection error: {}", error.message());
        let _ = writeln!(self.err, "   Code: {}", error.code().unwrap_or("n/a"));
        let _ = writeln!(self.err, "   Hint: {}", error.suggestion());
        let _ = self.err.flush();
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> ProbeObserver for ConsoleReporter<O, E> {
    fn connecting(&mut self, config: &ConnectionConfig) {
        let _ = writeln!(
            self.out,
            "Testing PostgreSQL connection to {} ...",
            config.masked_url()
        );
        let _ = self.out.flush();
    }

    fn connected(&mut self) {
        let _ = writeln!(self.out, "Connection established");
    }

    fn identity(&mut self, identity: &ServerIdentity) {
        let _ = writeln!(self.out, "Connection info:");
        let _ = writeln!(self.out, "   User: {}", identity.current_user);
        let _ = writeln!(self.out, "   Database: {}", identity.current_database);
        let _ = writeln!(self.out, "   Version: {}", identity.version_summary());
    }

    fn row_count(&mut self, _table: &str, count: i64) {
        let _ = writeln!(self.out, "Total customers in database: {}", count);
    }
}
