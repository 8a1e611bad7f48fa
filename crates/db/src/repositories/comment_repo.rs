//! Repository for the `comments` table.

use sqlx::PgPool;

use crate::models::comment::{Comment, CommentAuthor, CreateComment};

const COLUMNS: &str = "id, paper_id, user_id, text, created_at";

pub struct CommentRepo;

impl CommentRepo {
    /// Insert a comment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (paper_id, user_id, text)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(&input.paper_id)
            .bind(input.user_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// List every comment on a paper in creation order.
    pub async fn list_for_paper(pool: &PgPool, paper_id: &str) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments \
             WHERE paper_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(paper_id)
            .fetch_all(pool)
            .await
    }

    /// Distinct authors of the comments on a paper.
    ///
    /// One row per user no matter how many comments they wrote; anonymous
    /// comments are skipped. An unknown paper yields an empty list.
    pub async fn distinct_authors(
        pool: &PgPool,
        paper_id: &str,
    ) -> Result<Vec<CommentAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentAuthor>(
            "SELECT DISTINCT u.id AS user_id, u.email, u.username \
             FROM comments c \
             JOIN users u ON u.id = c.user_id \
             WHERE c.paper_id = $1",
        )
        .bind(paper_id)
        .fetch_all(pool)
        .await
    }
}
