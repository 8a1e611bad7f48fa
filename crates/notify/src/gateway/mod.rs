//! Email delivery gateways.
//!
//! [`MailGateway`] is the only seam between fan-out and the outside world.
//! Production uses [`MailgunGateway`] or [`SmtpGateway`]; [`LogGateway`]
//! stands in when neither is configured.

use std::time::Duration;

use async_trait::async_trait;

use crate::formatter::OutgoingEmail;

pub mod log;
pub mod mailgun;
pub mod smtp;

pub use log::LogGateway;
pub use mailgun::{MailgunConfig, MailgunGateway};
pub use smtp::{SmtpConfig, SmtpGateway};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// A single send failed. Never fatal to the fan-out as a whole.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status code.
    #[error("Mail provider returned HTTP {0}")]
    HttpStatus(u16),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The send did not finish within the dispatch timeout.
    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    /// The gateway refused the message for another reason.
    #[error("Rejected: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// MailGateway
// ---------------------------------------------------------------------------

/// Delivers one formatted message.
#[async_trait]
pub trait MailGateway: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn send(&self, message: &OutgoingEmail) -> Result<(), DispatchError>;
}
