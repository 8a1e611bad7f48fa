//! Consent-aware notification fan-out.
//!
//! This crate turns paper activity into personalised emails:
//!
//! - [`RecipientResolver`] - who should hear about a new comment (distinct
//!   prior participants, minus the author and anyone who muted the paper).
//! - [`NotificationFormatter`] - subject, template variables and a signed
//!   mute link per recipient.
//! - [`gateway`] - the [`MailGateway`] seam plus Mailgun, SMTP and logging
//!   implementations.
//! - [`dispatch`] - bounded-concurrency sending with per-call timeouts.
//! - [`NotificationService`] - the entry point used by the HTTP layer.
//!
//! Delivery is best-effort: a failed send is logged and recorded in the
//! [`FanOutReport`], never propagated to the request that triggered it.

pub mod dispatch;
pub mod error;
pub mod event;
pub mod formatter;
pub mod gateway;
pub mod resolver;
pub mod service;
pub mod store;

pub use dispatch::{DeliveryAttempt, DeliveryOutcome, DispatchConfig, FanOutReport};
pub use error::NotifyError;
pub use event::{CommentCreated, ReplyCreated};
pub use formatter::{LinkConfig, NotificationFormatter, OutgoingEmail};
pub use gateway::{DispatchError, MailGateway};
pub use resolver::RecipientResolver;
pub use service::NotificationService;
pub use store::{ConsentRegistry, NotificationStore, ParticipantDirectory, PgNotificationStore, Recipient};
