//! Storage seams used by the resolver and the unsubscribe flow.
//!
//! [`PgNotificationStore`] is the production implementation; tests supply
//! in-memory fakes.

use std::collections::HashSet;

use async_trait::async_trait;
use marginalia_core::types::DbId;
use marginalia_db::models::comment::CommentAuthor;
use marginalia_db::models::user::User;
use serde::Serialize;

mod postgres;

pub use postgres::PgNotificationStore;

/// A user who can receive a notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Recipient {
    pub user_id: DbId,
    pub email: String,
    /// Display name used in the greeting.
    pub name: String,
}

impl From<CommentAuthor> for Recipient {
    fn from(author: CommentAuthor) -> Self {
        Self {
            user_id: author.user_id,
            email: author.email,
            name: author.username,
        }
    }
}

impl From<User> for Recipient {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            name: user.username,
        }
    }
}

/// The persisted set of `(user, paper)` mute records.
///
/// Reads may lag a concurrent [`record_unsubscribe`](Self::record_unsubscribe);
/// at worst one extra notification goes out before the mute takes effect.
#[async_trait]
pub trait ConsentRegistry: Send + Sync {
    async fn has_unsubscribed(&self, user_id: DbId, paper_id: &str) -> Result<bool, sqlx::Error>;

    /// Idempotent insert. Returns `true` if the pair was new.
    async fn record_unsubscribe(&self, user_id: DbId, paper_id: &str)
        -> Result<bool, sqlx::Error>;

    /// Bulk form of [`has_unsubscribed`](Self::has_unsubscribed) for one paper.
    async fn unsubscribed_user_ids(&self, paper_id: &str) -> Result<HashSet<DbId>, sqlx::Error>;
}

/// Read access to users and who commented where.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Authors of comments on `paper_id`, one entry per user, anonymous
    /// comments excluded. Unknown papers yield an empty list.
    async fn comment_authors(&self, paper_id: &str) -> Result<Vec<Recipient>, sqlx::Error>;

    async fn find_user(&self, user_id: DbId) -> Result<Option<Recipient>, sqlx::Error>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Recipient>, sqlx::Error>;
}

/// Everything the notification service needs from storage.
pub trait NotificationStore: ConsentRegistry + ParticipantDirectory {}

impl<T: ConsentRegistry + ParticipantDirectory> NotificationStore for T {}
