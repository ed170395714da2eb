//! pg-probe library
//!
//! A one-shot connectivity probe for PostgreSQL: open a single connection,
//! check the server identity, count the rows of the `customers` table and
//! release the connection on every exit path.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod probe;
pub mod report;

pub use config::Config;
pub use error::{ProbeError, ProbeResult};
pub use probe::ConnectivityProbe;
