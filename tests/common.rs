use fitcore_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::notification::NotificationKind,
    domain::models::participant::SessionParticipant,
    domain::ports::{NotificationSender, ParticipantRepository},
    domain::services::{
        materializer::InstanceMaterializer, notify::Notifier, session_service::SessionService,
    },
    infra::repositories::{
        sqlite_client_directory::SqliteClientDirectory,
        sqlite_group_directory::SqliteGroupDirectory,
        sqlite_participant_repo::SqliteParticipantRepo,
        sqlite_session_repo::SqliteSessionRepo,
    },
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::Router;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SentNotification {
    pub user_id: String,
    pub kind: String,
    pub context: Value,
}

#[derive(Default)]
pub struct RecordingNotificationSender {
    pub sent: Mutex<Vec<SentNotification>>,
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        context: &Value,
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentNotification {
            user_id: user_id.to_string(),
            kind: kind.as_str().to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}

pub struct FailingNotificationSender;

#[async_trait]
impl NotificationSender for FailingNotificationSender {
    async fn notify(
        &self,
        _user_id: &str,
        _kind: NotificationKind,
        _context: &Value,
    ) -> Result<(), AppError> {
        Err(AppError::Upstream("notification service unreachable".to_string()))
    }
}

// Delegates to the real repository but refuses every roster read.
pub struct BrokenRosterRepo {
    inner: Arc<dyn ParticipantRepository>,
}

#[async_trait]
impl ParticipantRepository for BrokenRosterRepo {
    async fn find(&self, session_id: &str, user_id: &str) -> Result<Option<SessionParticipant>, AppError> {
        self.inner.find(session_id, user_id).await
    }

    async fn list_by_session(&self, _session_id: &str) -> Result<Vec<SessionParticipant>, AppError> {
        Err(AppError::Internal)
    }

    async fn register(&self, session_id: &str, user_id: &str) -> Result<SessionParticipant, AppError> {
        self.inner.register(session_id, user_id).await
    }

    async fn update(&self, participant: &SessionParticipant) -> Result<SessionParticipant, AppError> {
        self.inner.update(participant).await
    }
}

#[derive(Serialize)]
struct TestClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    exp: i64,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub notifications: Arc<RecordingNotificationSender>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let recorder = Arc::new(RecordingNotificationSender::default());
        Self::build(recorder.clone(), recorder, false).await
    }

    pub async fn with_failing_notifier() -> Self {
        let recorder = Arc::new(RecordingNotificationSender::default());
        Self::build(Arc::new(FailingNotificationSender), recorder, false).await
    }

    pub async fn with_broken_roster() -> Self {
        let recorder = Arc::new(RecordingNotificationSender::default());
        Self::build(recorder.clone(), recorder, true).await
    }

    async fn build(
        sender: Arc<dyn NotificationSender>,
        recorder: Arc<RecordingNotificationSender>,
        break_roster: bool,
    ) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            notify_service_url: "http://localhost".to_string(),
            notify_service_token: "token".to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
        };

        let session_repo = Arc::new(SqliteSessionRepo::new(pool.clone()));
        let participant_repo: Arc<dyn ParticipantRepository> = if break_roster {
            Arc::new(BrokenRosterRepo { inner: Arc::new(SqliteParticipantRepo::new(pool.clone())) })
        } else {
            Arc::new(SqliteParticipantRepo::new(pool.clone()))
        };
        let group_directory = Arc::new(SqliteGroupDirectory::new(pool.clone()));
        let client_directory = Arc::new(SqliteClientDirectory::new(pool.clone()));

        let session_service = Arc::new(SessionService::new(
            session_repo.clone(),
            participant_repo.clone(),
            group_directory.clone(),
            client_directory.clone(),
            Notifier::new(sender.clone()),
        ));
        let materializer = Arc::new(InstanceMaterializer::new(session_repo.clone()));

        let state = Arc::new(AppState {
            config,
            session_repo,
            participant_repo,
            group_directory,
            client_directory,
            notification_sender: sender,
            session_service,
            materializer,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            notifications: recorder,
        }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let key = EncodingKey::from_ed_pem(priv_key_pem.as_bytes())
            .expect("Invalid test private key");

        let claims = TestClaims {
            iss: "test-issuer",
            sub: user_id,
            aud: "fitcore-clients",
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };

        encode(&Header::new(Algorithm::EdDSA), &claims, &key).expect("Failed to sign test token")
    }

    pub async fn seed_group_member(&self, group_id: &str, user_id: &str, status: &str) {
        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, status, joined_at) VALUES (?, ?, ?, ?)"
        )
            .bind(group_id)
            .bind(user_id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .expect("Failed to seed group member");
    }

    pub async fn seed_client(&self, instructor_id: &str, user_id: &str, status: &str) {
        sqlx::query(
            "INSERT INTO client_relationships (instructor_id, user_id, status, created_at) VALUES (?, ?, ?, ?)"
        )
            .bind(instructor_id)
            .bind(user_id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .expect("Failed to seed client relationship");
    }

    // Dispatch runs on detached tasks; give them a moment to land.
    pub async fn settle_notifications(&self) {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
