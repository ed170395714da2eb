//! Integration tests against a live PostgreSQL server.
//!
//! Set TEST_PG_HOST to run these tests. TEST_PG_PORT, TEST_PG_DATABASE,
//! TEST_PG_USER and TEST_PG_PASSWORD default to 5432 / postgres / postgres / none.
//! Example: TEST_PG_HOST=localhost TEST_PG_DATABASE=northwind TEST_PG_USER=northwind TEST_PG_PASSWORD=northwind

use pg_probe::models::{ConnectionConfig, ServerIdentity, SslMode};
use pg_probe::probe::{ConnectivityProbe, ProbeObserver};
use sqlx::{Connection, PgConnection};
use std::time::Duration;

fn live_config() -> Option<ConnectionConfig> {
    let host = match std::env::var("TEST_PG_HOST") {
        Ok(host) => host,
        Err(_) => {
            eprintln!("Skipping test: TEST_PG_HOST not set");
            return None;
        }
    };
    let port = std::env::var("TEST_PG_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5432);
    let database = std::env::var("TEST_PG_DATABASE").unwrap_or_else(|_| "postgres".to_string());
    let user = std::env::var("TEST_PG_USER").unwrap_or_else(|_| "postgres".to_string());

    let mut config = ConnectionConfig::new(host, database, user)
        .unwrap()
        .with_port(port)
        .with_ssl_mode(SslMode::Disable);
    if let Ok(password) = std::env::var("TEST_PG_PASSWORD") {
        config = config.with_password(password);
    }
    Some(config)
}

/// Sessions on the server carrying `application_name`.
async fn sessions_named(admin: &mut PgConnection, application_name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM pg_stat_activity WHERE application_name = $1",
    )
    .bind(application_name)
    .fetch_one(admin)
    .await
    .unwrap()
}

/// Backends exit asynchronously after Terminate; give them a moment.
async fn wait_for_no_sessions(admin: &mut PgConnection, application_name: &str) -> i64 {
    let mut remaining = sessions_named(admin, application_name).await;
    for _ in 0..20 {
        if remaining == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        remaining = sessions_named(admin, application_name).await;
    }
    remaining
}

#[derive(Default)]
struct RecordingObserver {
    identity: Option<ServerIdentity>,
    count: Option<i64>,
}

impl ProbeObserver for RecordingObserver {
    fn identity(&mut self, identity: &ServerIdentity) {
        self.identity = Some(identity.clone());
    }

    fn row_count(&mut self, _table: &str, count: i64) {
        self.count = Some(count);
    }
}

#[tokio::test]
async fn test_probe_reports_identity_and_exact_row_count() {
    let Some(config) = live_config() else {
        return;
    };

    let pid = std::process::id();
    let table = format!("pg_probe_customers_{}", pid);
    let application_name = format!("pg-probe-success-{}", pid);
    let config = config.with_application_name(&application_name);

    let admin_options = config.connect_options().application_name("pg-probe-admin");
    let mut admin = PgConnection::connect_with(&admin_options).await.unwrap();
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table))
        .execute(&mut admin)
        .await
        .unwrap();
    sqlx::query(&format!(
        "CREATE TABLE \"{}\" (id INT PRIMARY KEY, company_name TEXT NOT NULL)",
        table
    ))
    .execute(&mut admin)
    .await
    .unwrap();
    sqlx::query(&format!(
        "INSERT INTO \"{}\" SELECT g, 'Company ' || g FROM generate_series(1, 7) AS g",
        table
    ))
    .execute(&mut admin)
    .await
    .unwrap();

    let probe = ConnectivityProbe::new().with_table(&table);
    let mut observer = RecordingObserver::default();
    let result = probe.run(&config, &mut observer).await;
    let remaining_sessions = wait_for_no_sessions(&mut admin, &application_name).await;

    sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table))
        .execute(&mut admin)
        .await
        .unwrap();
    admin.close().await.unwrap();

    let report = result.unwrap();
    assert_eq!(report.customer_count, 7);
    assert_eq!(observer.count, Some(7));
    assert_eq!(report.current_user(), config.user);
    assert_eq!(report.current_database(), config.database);
    assert!(report.server_version().starts_with("PostgreSQL"));
    assert_eq!(
        report.identity.version_summary(),
        report.server_version().split(',').next().unwrap()
    );
    assert_eq!(probe.open_connections(), 0);
    assert_eq!(remaining_sessions, 0);
}

#[tokio::test]
async fn test_missing_table_is_query_error_after_identity() {
    let Some(config) = live_config() else {
        return;
    };

    let probe = ConnectivityProbe::new().with_table("pg_probe_no_such_table");
    let mut observer = RecordingObserver::default();

    let err = probe.run(&config, &mut observer).await.unwrap_err();

    assert!(!err.is_connection(), "expected query error, got {:?}", err);
    assert_eq!(err.code(), Some("42P01"));
    assert!(observer.identity.is_some());
    assert!(observer.count.is_none());
    assert_eq!(probe.open_connections(), 0);
}

#[tokio::test]
async fn test_wrong_password_is_connection_error() {
    let Some(config) = live_config() else {
        return;
    };

    let config = config.with_password("definitely-not-the-password");
    let probe = ConnectivityProbe::new();

    match probe.probe(&config).await {
        Err(err) if err.is_connection() => assert_eq!(err.code(), Some("28P01")),
        // trust authentication ignores the password
        _ => eprintln!("Server did not check the password (trust auth); nothing to verify"),
    }
    assert_eq!(probe.open_connections(), 0);
}

#[tokio::test]
async fn test_repeated_runs_leave_no_server_sessions() {
    let Some(config) = live_config() else {
        return;
    };

    let application_name = format!("pg-probe-test-{}", std::process::id());
    let config = config.with_application_name(&application_name);
    let admin_options = config.connect_options().application_name("pg-probe-admin");
    let mut admin = PgConnection::connect_with(&admin_options).await.unwrap();

    let probe = ConnectivityProbe::new().with_table("pg_probe_no_such_table");
    for _ in 0..3 {
        let _ = probe.probe(&config).await;
        assert_eq!(probe.open_connections(), 0);
        assert_eq!(wait_for_no_sessions(&mut admin, &application_name).await, 0);
    }

    admin.close().await.unwrap();
}
