use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::materializer::InstanceMaterializer;
use crate::domain::services::notify::Notifier;
use crate::domain::services::session_service::SessionService;
use crate::infra::notify::http_notification_sender::HttpNotificationSender;
use crate::infra::repositories::{
    postgres_client_directory::PostgresClientDirectory,
    postgres_group_directory::PostgresGroupDirectory,
    postgres_participant_repo::PostgresParticipantRepo,
    postgres_session_repo::PostgresSessionRepo,
    sqlite_client_directory::SqliteClientDirectory,
    sqlite_group_directory::SqliteGroupDirectory,
    sqlite_participant_repo::SqliteParticipantRepo,
    sqlite_session_repo::SqliteSessionRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let notification_sender = Arc::new(HttpNotificationSender::new(
        config.notify_service_url.clone(),
        config.notify_service_token.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let session_repo = Arc::new(PostgresSessionRepo::new(pool.clone()));
        let participant_repo = Arc::new(PostgresParticipantRepo::new(pool.clone()));
        let group_directory = Arc::new(PostgresGroupDirectory::new(pool.clone()));
        let client_directory = Arc::new(PostgresClientDirectory::new(pool.clone()));

        let session_service = Arc::new(SessionService::new(
            session_repo.clone(),
            participant_repo.clone(),
            group_directory.clone(),
            client_directory.clone(),
            Notifier::new(notification_sender.clone()),
        ));
        let materializer = Arc::new(InstanceMaterializer::new(session_repo.clone()));

        AppState {
            config: config.clone(),
            session_repo,
            participant_repo,
            group_directory,
            client_directory,
            notification_sender,
            session_service,
            materializer,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));
        let participant_repo = Arc::new(SqliteParticipantRepo::new(pool.clone()));
        let group_directory = Arc::new(SqliteGroupDirectory::new(pool.clone()));
        let client_directory = Arc::new(SqliteClientDirectory::new(pool.clone()));

        let session_service = Arc::new(SessionService::new(
            session_repo.clone(),
            participant_repo.clone(),
            group_directory.clone(),
            client_directory.clone(),
            Notifier::new(notification_sender.clone()),
        ));
        let materializer = Arc::new(InstanceMaterializer::new(session_repo.clone()));

        AppState {
            config: config.clone(),
            session_repo,
            participant_repo,
            group_directory,
            client_directory,
            notification_sender,
            session_service,
            materializer,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
