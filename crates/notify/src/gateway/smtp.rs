//! Email delivery via SMTP.
//!
//! [`SmtpGateway`] wraps the `lettre` async SMTP transport. SMTP has no notion
//! of provider-side templates, so the template variables are rendered into a
//! plain-text body here. Configuration is loaded from environment variables;
//! if `SMTP_HOST` is not set, [`SmtpConfig::from_env`] returns `None` and no
//! gateway should be constructed.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{DispatchError, MailGateway};
use crate::formatter::{vars, OutgoingEmail};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@marginalia.local";

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMTP gateway.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                     |
    /// |-----------------|----------|-----------------------------|
    /// | `SMTP_HOST`     | yes      | -                           |
    /// | `SMTP_PORT`     | no       | `587`                       |
    /// | `SMTP_FROM`     | no       | `noreply@marginalia.local`  |
    /// | `SMTP_USER`     | no       | -                           |
    /// | `SMTP_PASSWORD` | no       | -                           |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from_address", &self.from_address)
            .field("smtp_user", &self.smtp_user)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// SmtpGateway
// ---------------------------------------------------------------------------

/// Sends plain-text notification emails over SMTP.
pub struct SmtpGateway {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpGateway {
    /// Build the STARTTLS transport once; it pools connections internally.
    pub fn new(config: &SmtpConfig) -> Result<Self, DispatchError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from: config.from_address.parse()?,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailGateway for SmtpGateway {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &OutgoingEmail) -> Result<(), DispatchError> {
        let to = Mailbox::new(
            Some(message.recipient_name.clone()),
            message.recipient_address.parse()?,
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(render_plain_text(message))
            .map_err(|e| DispatchError::Build(e.to_string()))?;

        self.transport.send(email).await?;

        tracing::debug!(to = %message.recipient_address, "Notification email sent via SMTP");
        Ok(())
    }
}

/// Render the template variables as a plain-text body.
fn render_plain_text(message: &OutgoingEmail) -> String {
    let var = |key| message.var(key).unwrap_or_default();
    format!(
        "Hi {},\n\n{}\n\n{}\n\n--\nTo stop receiving notifications about this paper, visit:\n{}\n",
        var(vars::FIRST_NAME),
        var(vars::TEXT),
        var(vars::LINK),
        var(vars::MUTE_LINK),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
