#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use marginalia_api::config::ServerConfig;
use marginalia_api::mailer::MailerConfig;
use marginalia_api::router::build_app_router;
use marginalia_api::state::AppState;
use marginalia_core::mute_token::{MuteTokenCodec, MuteTokenConfig};
use marginalia_notify::{
    ConsentRegistry, DispatchConfig, DispatchError, LinkConfig, MailGateway, NotificationService,
    NotificationStore, OutgoingEmail, ParticipantDirectory, Recipient,
};

pub const SECRET: &str = "api-test-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        frontend_url: "https://app.example.org".to_string(),
        mute_token: MuteTokenConfig::new(SECRET),
        dispatch: DispatchConfig {
            max_concurrency: 4,
            send_timeout: Duration::from_millis(500),
        },
        mailer: MailerConfig::Log,
    }
}

pub fn codec() -> MuteTokenCodec {
    MuteTokenCodec::new(&test_config().mute_token)
}

/// Build the full application router around in-memory fakes.
///
/// The pool is lazy and points at a closed port, so anything that really
/// touches Postgres fails fast instead of hanging.
pub fn build_test_app(store: Arc<dyn NotificationStore>, gateway: Arc<RecordingGateway>) -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://marginalia@127.0.0.1:1/marginalia_test")
        .unwrap();

    let notifications = NotificationService::new(
        store,
        MuteTokenCodec::new(&config.mute_token),
        LinkConfig::new(config.frontend_url.clone()),
        gateway,
        config.dispatch,
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        notifications: Arc::new(notifications),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<Recipient>>,
    /// (paper_id, author)
    comments: Mutex<Vec<(String, i64)>>,
    unsubscribes: Mutex<HashSet<(i64, String)>>,
}

impl MemoryStore {
    pub fn add_user(&self, id: i64, name: &str) {
        self.users.lock().unwrap().push(Recipient {
            user_id: id,
            email: format!("{}@example.org", name.to_lowercase()),
            name: name.to_string(),
        });
    }

    pub fn add_comment(&self, paper_id: &str, user_id: i64) {
        self.comments
            .lock()
            .unwrap()
            .push((paper_id.to_string(), user_id));
    }

    pub fn is_muted(&self, user_id: i64, paper_id: &str) -> bool {
        self.unsubscribes
            .lock()
            .unwrap()
            .contains(&(user_id, paper_id.to_string()))
    }
}

#[async_trait]
impl ConsentRegistry for MemoryStore {
    async fn has_unsubscribed(&self, user_id: i64, paper_id: &str) -> Result<bool, sqlx::Error> {
        Ok(self.is_muted(user_id, paper_id))
    }

    async fn record_unsubscribe(&self, user_id: i64, paper_id: &str) -> Result<bool, sqlx::Error> {
        Ok(self
            .unsubscribes
            .lock()
            .unwrap()
            .insert((user_id, paper_id.to_string())))
    }

    async fn unsubscribed_user_ids(&self, paper_id: &str) -> Result<HashSet<i64>, sqlx::Error> {
        Ok(self
            .unsubscribes
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, p)| p == paper_id)
            .map(|(u, _)| *u)
            .collect())
    }
}

#[async_trait]
impl ParticipantDirectory for MemoryStore {
    /// One entry per comment, repeats included.
    async fn comment_authors(&self, paper_id: &str) -> Result<Vec<Recipient>, sqlx::Error> {
        let users = self.users.lock().unwrap();
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == paper_id)
            .filter_map(|(_, author)| users.iter().find(|u| u.user_id == *author).cloned())
            .collect())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<Recipient>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Recipient>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

/// A store whose every query fails.
pub struct BrokenStore;

#[async_trait]
impl ConsentRegistry for BrokenStore {
    async fn has_unsubscribed(&self, _: i64, _: &str) -> Result<bool, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn record_unsubscribe(&self, _: i64, _: &str) -> Result<bool, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn unsubscribed_user_ids(&self, _: &str) -> Result<HashSet<i64>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl ParticipantDirectory for BrokenStore {
    async fn comment_authors(&self, _: &str) -> Result<Vec<Recipient>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn find_user(&self, _: i64) -> Result<Option<Recipient>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }

    async fn find_user_by_email(&self, _: &str) -> Result<Option<Recipient>, sqlx::Error> {
        Err(sqlx::Error::PoolTimedOut)
    }
}

/// Records every message; rejects those addressed to `failing`.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: HashSet<String>,
}

impl RecordingGateway {
    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            failing: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self) -> HashSet<String> {
        self.sent()
            .into_iter()
            .map(|m| m.recipient_address)
            .collect()
    }
}

#[async_trait]
impl MailGateway for RecordingGateway {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &OutgoingEmail) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(message.clone());
        if self.failing.contains(&message.recipient_address) {
            return Err(DispatchError::HttpStatus(503));
        }
        Ok(())
    }
}
