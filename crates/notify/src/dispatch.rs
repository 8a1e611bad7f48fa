//! Bounded-concurrency delivery of formatted messages.
//!
//! Sends run concurrently up to [`DispatchConfig::max_concurrency`], each
//! under its own [`DispatchConfig::send_timeout`], so one slow or failing
//! recipient never holds up the rest. Every attempt lands in the
//! [`FanOutReport`]; failures are logged and never returned as errors.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use marginalia_core::types::DbId;
use serde::Serialize;

use crate::formatter::OutgoingEmail;
use crate::gateway::{DispatchError, MailGateway};

/// Default number of sends in flight at once.
const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Default timeout for one send.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// DispatchConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Upper bound on concurrent gateway calls (at least 1).
    pub max_concurrency: usize,
    /// A send still pending after this long counts as failed.
    pub send_timeout: Duration,
}

impl DispatchConfig {
    /// Load from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `DISPATCH_CONCURRENCY`  | `8`     |
    /// | `DISPATCH_TIMEOUT_SECS` | `10`    |
    pub fn from_env() -> Self {
        let max_concurrency = std::env::var("DISPATCH_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);
        let send_timeout = std::env::var("DISPATCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SEND_TIMEOUT);
        Self {
            max_concurrency,
            send_timeout,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Result of one send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

/// One recipient's send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryAttempt {
    pub user_id: DbId,
    pub address: String,
    pub outcome: DeliveryOutcome,
}

/// Every attempt made for one notification event, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FanOutReport {
    pub attempts: Vec<DeliveryAttempt>,
}

impl FanOutReport {
    pub fn attempted(&self) -> usize {
        self.attempts.len()
    }

    pub fn delivered(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.outcome == DeliveryOutcome::Delivered)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }

    /// The attempt for `user_id`, if one was made.
    pub fn attempt_for(&self, user_id: DbId) -> Option<&DeliveryAttempt> {
        self.attempts.iter().find(|a| a.user_id == user_id)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Send every message, at most `config.max_concurrency` at a time.
pub async fn dispatch_all(
    gateway: &dyn MailGateway,
    messages: Vec<(DbId, OutgoingEmail)>,
    config: DispatchConfig,
) -> FanOutReport {
    let attempts = stream::iter(messages)
        .map(|(user_id, message)| async move {
            let outcome = match send_with_timeout(gateway, &message, config.send_timeout).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(e) => {
                    tracing::warn!(
                        user_id,
                        to = %message.recipient_address,
                        gateway = gateway.name(),
                        error = %e,
                        "Failed to send notification email"
                    );
                    DeliveryOutcome::Failed(e.to_string())
                }
            };
            DeliveryAttempt {
                user_id,
                address: message.recipient_address,
                outcome,
            }
        })
        .buffer_unordered(config.max_concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    FanOutReport { attempts }
}

async fn send_with_timeout(
    gateway: &dyn MailGateway,
    message: &OutgoingEmail,
    timeout: Duration,
) -> Result<(), DispatchError> {
    tokio::time::timeout(timeout, gateway.send(message))
        .await
        .map_err(|_| DispatchError::Timeout(timeout))?
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
