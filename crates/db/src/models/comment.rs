//! Comment entity model and DTOs.

use marginalia_core::types::{DbId, PaperId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub paper_id: PaperId,
    /// `None` for anonymous comments.
    pub user_id: Option<DbId>,
    pub text: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub paper_id: PaperId,
    pub user_id: Option<DbId>,
    pub text: String,
}

/// A distinct comment author on a paper, as needed for notification fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow, Serialize)]
pub struct CommentAuthor {
    pub user_id: DbId,
    pub email: String,
    pub username: String,
}
