//! Events that start a notification fan-out.

use marginalia_core::types::{DbId, PaperId};
use serde::{Deserialize, Serialize};

/// A comment was posted on a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCreated {
    pub paper_id: PaperId,
    pub paper_title: String,
    /// Author of the new comment, never notified about their own comment.
    /// `None` for anonymous comments.
    pub triggering_user_id: Option<DbId>,
    /// Used to anchor the paper link to the new comment.
    pub new_comment_id: DbId,
}

/// Someone replied to a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyCreated {
    pub paper_id: PaperId,
    pub paper_title: String,
    /// Author of the comment that received the reply.
    pub comment_author_id: DbId,
    pub replying_user_id: DbId,
}
