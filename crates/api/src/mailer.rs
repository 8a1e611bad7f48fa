//! Mail provider selection.

use std::sync::Arc;

use marginalia_notify::gateway::{
    LogGateway, MailgunConfig, MailgunGateway, SmtpConfig, SmtpGateway,
};
use marginalia_notify::{DispatchError, MailGateway};

/// The configured mail provider.
#[derive(Debug, Clone)]
pub enum MailerConfig {
    Mailgun(MailgunConfig),
    Smtp(SmtpConfig),
    /// Nothing configured: notifications are only logged.
    Log,
}

impl MailerConfig {
    /// Mailgun if `MAILGUN_API_KEY`/`MAILGUN_DOMAIN` are set, otherwise SMTP
    /// if `SMTP_HOST` is set, otherwise log-only.
    pub fn from_env() -> Self {
        if let Some(config) = MailgunConfig::from_env() {
            return Self::Mailgun(config);
        }
        if let Some(config) = SmtpConfig::from_env() {
            return Self::Smtp(config);
        }
        Self::Log
    }

    /// Construct the gateway this config describes.
    pub fn build(&self) -> Result<Arc<dyn MailGateway>, DispatchError> {
        let gateway: Arc<dyn MailGateway> = match self {
            Self::Mailgun(config) => Arc::new(MailgunGateway::new(config.clone())?),
            Self::Smtp(config) => Arc::new(SmtpGateway::new(config)?),
            Self::Log => {
                tracing::warn!("No mail provider configured, notifications will only be logged");
                Arc::new(LogGateway)
            }
        };
        Ok(gateway)
    }
}
