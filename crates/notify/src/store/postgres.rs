use std::collections::HashSet;

use async_trait::async_trait;
use marginalia_core::types::DbId;
use marginalia_db::repositories::{CommentRepo, UnsubscribeRepo, UserRepo};
use marginalia_db::DbPool;

use super::{ConsentRegistry, ParticipantDirectory, Recipient};

/// Postgres-backed store delegating to the `marginalia_db` repositories.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsentRegistry for PgNotificationStore {
    async fn has_unsubscribed(&self, user_id: DbId, paper_id: &str) -> Result<bool, sqlx::Error> {
        UnsubscribeRepo::exists(&self.pool, user_id, paper_id).await
    }

    async fn record_unsubscribe(
        &self,
        user_id: DbId,
        paper_id: &str,
    ) -> Result<bool, sqlx::Error> {
        UnsubscribeRepo::insert(&self.pool, user_id, paper_id).await
    }

    async fn unsubscribed_user_ids(&self, paper_id: &str) -> Result<HashSet<DbId>, sqlx::Error> {
        UnsubscribeRepo::user_ids_for_paper(&self.pool, paper_id).await
    }
}

#[async_trait]
impl ParticipantDirectory for PgNotificationStore {
    async fn comment_authors(&self, paper_id: &str) -> Result<Vec<Recipient>, sqlx::Error> {
        let authors = CommentRepo::distinct_authors(&self.pool, paper_id).await?;
        Ok(authors.into_iter().map(Recipient::from).collect())
    }

    async fn find_user(&self, user_id: DbId) -> Result<Option<Recipient>, sqlx::Error> {
        Ok(UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .map(Recipient::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Recipient>, sqlx::Error> {
        Ok(UserRepo::find_by_email(&self.pool, email)
            .await?
            .map(Recipient::from))
    }
}
