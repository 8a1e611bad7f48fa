//! Repository for the `unsubscribes` table.

use std::collections::HashSet;

use marginalia_core::types::DbId;
use sqlx::PgPool;

use crate::models::unsubscribe::Unsubscribe;

const COLUMNS: &str = "user_id, paper_id, created_at";

/// Persistence for per-paper mute records.
pub struct UnsubscribeRepo;

impl UnsubscribeRepo {
    /// Record that `user_id` muted `paper_id` (idempotent).
    ///
    /// Returns `true` if a new row was written, `false` if the pair already
    /// existed.
    pub async fn insert(pool: &PgPool, user_id: DbId, paper_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO unsubscribes (user_id, paper_id) \
             VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(paper_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` has muted `paper_id`.
    pub async fn exists(pool: &PgPool, user_id: DbId, paper_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM unsubscribes WHERE user_id = $1 AND paper_id = $2)",
        )
        .bind(user_id)
        .bind(paper_id)
        .fetch_one(pool)
        .await
    }

    /// All users who muted `paper_id`, in one query.
    pub async fn user_ids_for_paper(
        pool: &PgPool,
        paper_id: &str,
    ) -> Result<HashSet<DbId>, sqlx::Error> {
        let ids: Vec<DbId> =
            sqlx::query_scalar("SELECT user_id FROM unsubscribes WHERE paper_id = $1")
                .bind(paper_id)
                .fetch_all(pool)
                .await?;
        Ok(ids.into_iter().collect())
    }

    /// List the records for a paper, oldest first.
    pub async fn list_for_paper(
        pool: &PgPool,
        paper_id: &str,
    ) -> Result<Vec<Unsubscribe>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM unsubscribes \
             WHERE paper_id = $1 \
             ORDER BY created_at, user_id"
        );
        sqlx::query_as::<_, Unsubscribe>(&query)
            .bind(paper_id)
            .fetch_all(pool)
            .await
    }
}
