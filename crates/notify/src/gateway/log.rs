use async_trait::async_trait;

use super::{DispatchError, MailGateway};
use crate::formatter::OutgoingEmail;

/// Development gateway: logs each message instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGateway;

#[async_trait]
impl MailGateway for LogGateway {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &OutgoingEmail) -> Result<(), DispatchError> {
        tracing::info!(
            to = %message.recipient_address,
            subject = %message.subject,
            template = %message.template,
            variables = ?message.variables,
            "Email delivery not configured, logging notification"
        );
        Ok(())
    }
}
