//! The notification entry point used by the HTTP layer.

use std::sync::Arc;

use marginalia_core::mute_token::{MuteTokenCodec, MutedPaper};

use crate::dispatch::{dispatch_all, DispatchConfig, FanOutReport};
use crate::error::NotifyError;
use crate::event::{CommentCreated, ReplyCreated};
use crate::formatter::{LinkConfig, NotificationFormatter};
use crate::gateway::MailGateway;
use crate::resolver::RecipientResolver;
use crate::store::NotificationStore;

/// Resolves, formats and dispatches notifications, and applies mute links.
///
/// Runs inside the request that reported the triggering activity. Only
/// storage failures are returned as errors; send failures are recorded in the
/// returned [`FanOutReport`].
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    resolver: RecipientResolver,
    formatter: NotificationFormatter,
    codec: MuteTokenCodec,
    gateway: Arc<dyn MailGateway>,
    dispatch: DispatchConfig,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        codec: MuteTokenCodec,
        links: LinkConfig,
        gateway: Arc<dyn MailGateway>,
        dispatch: DispatchConfig,
    ) -> Self {
        Self {
            resolver: RecipientResolver::new(Arc::clone(&store)),
            formatter: NotificationFormatter::new(codec.clone(), links),
            store,
            codec,
            gateway,
            dispatch,
        }
    }

    /// Name of the gateway messages go through.
    pub fn gateway_name(&self) -> &'static str {
        self.gateway.name()
    }

    /// Notify every prior participant of a paper about a new comment.
    pub async fn notify_new_comment(
        &self,
        event: &CommentCreated,
    ) -> Result<FanOutReport, NotifyError> {
        let recipients = self.resolver.resolve(event).await?;
        if recipients.is_empty() {
            tracing::debug!(paper_id = %event.paper_id, "No recipients for new comment");
            return Ok(FanOutReport::default());
        }

        let messages = recipients
            .iter()
            .map(|r| (r.user_id, self.formatter.new_comment(r, event)))
            .collect();
        let report = dispatch_all(self.gateway.as_ref(), messages, self.dispatch).await;

        tracing::info!(
            paper_id = %event.paper_id,
            comment_id = event.new_comment_id,
            attempted = report.attempted(),
            delivered = report.delivered(),
            failed = report.failed(),
            "New comment notifications dispatched"
        );
        Ok(report)
    }

    /// Notify a comment's author that somebody replied.
    ///
    /// Skipped (empty report) when the author replied to themselves, is
    /// unknown, or muted the paper.
    pub async fn notify_new_reply(&self, event: &ReplyCreated) -> Result<FanOutReport, NotifyError> {
        if event.comment_author_id == event.replying_user_id {
            return Ok(FanOutReport::default());
        }

        let Some(author) = self.store.find_user(event.comment_author_id).await? else {
            tracing::debug!(user_id = event.comment_author_id, "Reply to unknown user, skipping");
            return Ok(FanOutReport::default());
        };

        if self
            .store
            .has_unsubscribed(author.user_id, &event.paper_id)
            .await?
        {
            tracing::debug!(
                user_id = author.user_id,
                paper_id = %event.paper_id,
                "Recipient muted paper, skipping reply notification"
            );
            return Ok(FanOutReport::default());
        }

        let message = self.formatter.new_reply(&author, event);
        let report = dispatch_all(
            self.gateway.as_ref(),
            vec![(author.user_id, message)],
            self.dispatch,
        )
        .await;

        tracing::info!(
            paper_id = %event.paper_id,
            user_id = author.user_id,
            delivered = report.delivered(),
            "Reply notification dispatched"
        );
        Ok(report)
    }

    /// Apply a mute link: verify the token and record the unsubscribe.
    ///
    /// Following the same link twice is not an error.
    pub async fn unsubscribe(&self, token: &str) -> Result<MutedPaper, NotifyError> {
        let muted = self.codec.verify(token)?;

        let user = self
            .store
            .find_user_by_email(&muted.email)
            .await?
            .ok_or_else(|| NotifyError::UnknownRecipient(muted.email.clone()))?;

        let inserted = self
            .store
            .record_unsubscribe(user.user_id, &muted.paper_id)
            .await?;

        tracing::info!(
            user_id = user.user_id,
            paper_id = %muted.paper_id,
            new_record = inserted,
            "Recorded paper unsubscribe"
        );
        Ok(muted)
    }
}
