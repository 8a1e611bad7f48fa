//! Repository for the `papers` table.

use sqlx::PgPool;

use crate::models::paper::{CreatePaper, Paper};

const COLUMNS: &str = "id, title, created_at";

pub struct PaperRepo;

impl PaperRepo {
    /// Register a paper, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePaper) -> Result<Paper, sqlx::Error> {
        let query = format!(
            "INSERT INTO papers (id, title)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Paper>(&query)
            .bind(&input.id)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Paper>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM papers WHERE id = $1");
        sqlx::query_as::<_, Paper>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
