//! In-memory fakes for the store and gateway seams.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use marginalia_core::mute_token::{MuteTokenCodec, MuteTokenConfig};
use marginalia_notify::{
    ConsentRegistry, DispatchConfig, DispatchError, LinkConfig, MailGateway, NotificationService,
    OutgoingEmail, ParticipantDirectory, Recipient,
};

pub const SECRET: &str = "integration-test-secret";

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    users: HashMap<i64, Recipient>,
    /// (paper_id, author) in insertion order; `None` is anonymous.
    comments: Vec<(String, Option<i64>)>,
    unsubscribes: Vec<(i64, String)>,
}

/// Store backed by plain collections. Counts queries so tests can check the
/// resolver stays at a constant number of round trips.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub queries: AtomicUsize,
}

impl MemoryStore {
    pub fn add_user(&self, id: i64, name: &str) -> Recipient {
        let recipient = Recipient {
            user_id: id,
            email: format!("{}@example.org", name.to_lowercase()),
            name: name.to_string(),
        };
        self.tables
            .lock()
            .unwrap()
            .users
            .insert(id, recipient.clone());
        recipient
    }

    pub fn add_comment(&self, paper_id: &str, user_id: Option<i64>) {
        self.tables
            .lock()
            .unwrap()
            .comments
            .push((paper_id.to_string(), user_id));
    }

    pub fn mute(&self, user_id: i64, paper_id: &str) {
        self.tables
            .lock()
            .unwrap()
            .unsubscribes
            .push((user_id, paper_id.to_string()));
    }

    pub fn unsubscribe_rows(&self, user_id: i64, paper_id: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .unsubscribes
            .iter()
            .filter(|(u, p)| *u == user_id && p == paper_id)
            .count()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConsentRegistry for MemoryStore {
    async fn has_unsubscribed(&self, user_id: i64, paper_id: &str) -> Result<bool, sqlx::Error> {
        self.tick();
        Ok(self.unsubscribe_rows(user_id, paper_id) > 0)
    }

    async fn record_unsubscribe(&self, user_id: i64, paper_id: &str) -> Result<bool, sqlx::Error> {
        self.tick();
        let mut tables = self.tables.lock().unwrap();
        let exists = tables
            .unsubscribes
            .iter()
            .any(|(u, p)| *u == user_id && p == paper_id);
        if !exists {
            tables.unsubscribes.push((user_id, paper_id.to_string()));
        }
        Ok(!exists)
    }

    async fn unsubscribed_user_ids(&self, paper_id: &str) -> Result<HashSet<i64>, sqlx::Error> {
        self.tick();
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .unsubscribes
            .iter()
            .filter(|(_, p)| p == paper_id)
            .map(|(u, _)| *u)
            .collect())
    }
}

#[async_trait]
impl ParticipantDirectory for MemoryStore {
    /// One entry per authored comment, repeats included; collapsing them
    /// is left to the resolver.
    async fn comment_authors(&self, paper_id: &str) -> Result<Vec<Recipient>, sqlx::Error> {
        self.tick();
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .comments
            .iter()
            .filter(|(p, _)| p == paper_id)
            .filter_map(|(_, user)| *user)
            .filter_map(|id| tables.users.get(&id).cloned())
            .collect())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<Recipient>, sqlx::Error> {
        self.tick();
        Ok(self.tables.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Recipient>, sqlx::Error> {
        self.tick();
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
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

// ---------------------------------------------------------------------------
// RecordingGateway
// ---------------------------------------------------------------------------

/// Records every message it is asked to send. Addresses in `failing` are
/// rejected; addresses in `stalled` never complete within any sane timeout.
#[derive(Default)]
pub struct RecordingGateway {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub failing: HashSet<String>,
    pub stalled: HashSet<String>,
    pub delay: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl RecordingGateway {
    pub fn failing_for(addresses: &[&str]) -> Self {
        Self {
            failing: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn stalled_for(addresses: &[&str]) -> Self {
        Self {
            stalled: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
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
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.sent.lock().unwrap().push(message.clone());

        if self.stalled.contains(&message.recipient_address) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        } else if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&message.recipient_address) {
            return Err(DispatchError::Rejected("mailbox unavailable".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn codec() -> MuteTokenCodec {
    MuteTokenCodec::new(&MuteTokenConfig::new(SECRET))
}

pub fn service(
    store: Arc<MemoryStore>,
    gateway: Arc<RecordingGateway>,
    dispatch: DispatchConfig,
) -> NotificationService {
    NotificationService::new(
        store,
        codec(),
        LinkConfig::new("https://app.example.org"),
        gateway,
        dispatch,
    )
}
