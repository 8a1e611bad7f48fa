//! Unsubscribe record model.

use marginalia_core::types::{DbId, PaperId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `unsubscribes` table: `user_id` muted `paper_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Unsubscribe {
    pub user_id: DbId,
    pub paper_id: PaperId,
    pub created_at: Timestamp,
}
