//! Recipient resolution for new-comment notifications.

use std::collections::HashSet;
use std::sync::Arc;

use crate::event::CommentCreated;
use crate::store::{NotificationStore, Recipient};

/// Computes who should be told about a new comment.
///
/// Issues exactly two bulk queries per event (mute set, distinct authors)
/// regardless of how many people end up notified.
#[derive(Clone)]
pub struct RecipientResolver {
    store: Arc<dyn NotificationStore>,
}

impl RecipientResolver {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Distinct prior commenters on the paper, excluding the comment author
    /// and everyone who muted the paper.
    ///
    /// The order of the result is unspecified. A paper nobody commented on
    /// (or that does not exist) yields an empty list.
    pub async fn resolve(&self, event: &CommentCreated) -> Result<Vec<Recipient>, sqlx::Error> {
        let mut excluded = self.store.unsubscribed_user_ids(&event.paper_id).await?;
        if let Some(author) = event.triggering_user_id {
            excluded.insert(author);
        }

        let authors = self.store.comment_authors(&event.paper_id).await?;

        let mut seen = HashSet::with_capacity(authors.len());
        let recipients: Vec<Recipient> = authors
            .into_iter()
            .filter(|r| !excluded.contains(&r.user_id))
            .filter(|r| seen.insert(r.user_id))
            .collect();

        tracing::debug!(
            paper_id = %event.paper_id,
            excluded = excluded.len(),
            recipients = recipients.len(),
            "Resolved comment notification recipients"
        );

        Ok(recipients)
    }
}
