//! Paper entity model and DTOs.

use marginalia_core::types::{PaperId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `papers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Paper {
    pub id: PaperId,
    pub title: String,
    pub created_at: Timestamp,
}

/// DTO for registering a paper.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaper {
    pub id: PaperId,
    pub title: String,
}
