//! Mailgun HTTP API gateway.
//!
//! [`MailgunGateway`] posts each message as a form to
//! `{api_base}/v3/{domain}/messages`, naming a stored template and passing
//! the template variables as JSON in `h:X-Mailgun-Variables`. There are no
//! sender-side retries: a failed send is reported once and the fan-out moves
//! on.

use std::time::Duration;

use async_trait::async_trait;

use super::{DispatchError, MailGateway};
use crate::formatter::OutgoingEmail;

/// Default Mailgun API origin (US region).
const DEFAULT_API_BASE: &str = "https://api.mailgun.net";

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// MailgunConfig
// ---------------------------------------------------------------------------

/// Credentials and addressing for the Mailgun API.
#[derive(Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    /// Sending domain, e.g. `mail.example.org`.
    pub domain: String,
    /// RFC 5322 "From" header.
    pub from: String,
    pub api_base: String,
}

impl MailgunConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both `MAILGUN_API_KEY` and `MAILGUN_DOMAIN` are
    /// set.
    ///
    /// | Variable           | Required | Default                          |
    /// |--------------------|----------|----------------------------------|
    /// | `MAILGUN_API_KEY`  | yes      | -                                |
    /// | `MAILGUN_DOMAIN`   | yes      | -                                |
    /// | `MAILGUN_FROM`     | no       | `Marginalia <noreply@{domain}>`  |
    /// | `MAILGUN_API_BASE` | no       | `https://api.mailgun.net`        |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("MAILGUN_API_KEY").ok()?;
        let domain = std::env::var("MAILGUN_DOMAIN").ok()?;
        let from = std::env::var("MAILGUN_FROM")
            .unwrap_or_else(|_| format!("Marginalia <noreply@{domain}>"));
        let api_base =
            std::env::var("MAILGUN_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Some(Self {
            api_key,
            domain,
            from,
            api_base,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.domain
        )
    }
}

impl std::fmt::Debug for MailgunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailgunConfig")
            .field("domain", &self.domain)
            .field("from", &self.from)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// MailgunGateway
// ---------------------------------------------------------------------------

/// Sends template emails through Mailgun.
pub struct MailgunGateway {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunGateway {
    /// Create a gateway with a pre-configured HTTP client.
    pub fn new(config: MailgunConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Form fields for one message.
    fn form(&self, message: &OutgoingEmail) -> Result<Vec<(&'static str, String)>, DispatchError> {
        let variables = serde_json::to_string(&message.variables)
            .map_err(|e| DispatchError::Build(e.to_string()))?;
        Ok(vec![
            ("from", self.config.from.clone()),
            (
                "to",
                format!("{} <{}>", message.recipient_name, message.recipient_address),
            ),
            ("subject", message.subject.clone()),
            ("template", message.template.clone()),
            ("h:X-Mailgun-Variables", variables),
        ])
    }
}

#[async_trait]
impl MailGateway for MailgunGateway {
    fn name(&self) -> &'static str {
        "mailgun"
    }

    async fn send(&self, message: &OutgoingEmail) -> Result<(), DispatchError> {
        let form = self.form(message)?;
        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DispatchError::HttpStatus(response.status().as_u16()));
        }

        tracing::debug!(to = %message.recipient_address, "Mailgun accepted message");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
