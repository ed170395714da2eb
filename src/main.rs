//! pg-probe - Main entry point.
//!
//! Connects to PostgreSQL once, prints the server identity and the number of
//! customers, and exits non-zero if anything along the way fails.

use clap::Parser;
use pg_probe::config::Config;
use pg_probe::probe::ConnectivityProbe;
use pg_probe::report::ConsoleReporter;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse configuration from command line and environment
    let config = Config::parse();

    if config.enable_logs {
        init_tracing(&config);
    }

    let connection = match config.connection_config() {
        Ok(connection) => connection,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Usage: pg-probe --host <HOST> --port <PORT> --database <NAME> --user <USER> [--password <PASSWORD>]");
            return ExitCode::from(2);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        sslmode = %connection.ssl_mode,
        "Starting pg-probe"
    );

    let probe = ConnectivityProbe::new();
    let mut reporter = ConsoleReporter::stdio();
    let result = probe.run(&connection, &mut reporter).await;
    reporter.finish(&result);

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
