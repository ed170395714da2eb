//! Data models for pg-probe.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod report;

// Re-export commonly used types
pub use connection::{
    ConnectionConfig, ConnectionConfigError, DEFAULT_APPLICATION_NAME, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_PORT, SslMode,
};
pub use report::{ProbeReport, ServerIdentity};
