//! Database access layer.
//!
//! Opening, using and releasing the single connection a probe holds.

pub mod connection;

pub use connection::{ConnectionGuard, IDENTITY_QUERY, OpenConnections, count_query};
