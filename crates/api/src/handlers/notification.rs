//! Handlers for the `/notifications` resource.

use axum::extract::{Path, State};
use axum::Json;
use marginalia_core::types::{DbId, PaperId};
use marginalia_notify::{CommentCreated, DeliveryAttempt, FanOutReport, ReplyCreated};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /notifications/comment-created`.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentCreatedRequest {
    #[validate(length(min = 1, message = "paper_id must not be empty"))]
    pub paper_id: PaperId,
    #[validate(length(min = 1, message = "paper_title must not be empty"))]
    pub paper_title: String,
    /// Absent or `null` for anonymous comments.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub triggering_user_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub new_comment_id: DbId,
}

impl From<CommentCreatedRequest> for CommentCreated {
    fn from(req: CommentCreatedRequest) -> Self {
        Self {
            paper_id: req.paper_id,
            paper_title: req.paper_title,
            triggering_user_id: req.triggering_user_id,
            new_comment_id: req.new_comment_id,
        }
    }
}

/// Body of `POST /notifications/reply-created`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplyCreatedRequest {
    #[validate(length(min = 1, message = "paper_id must not be empty"))]
    pub paper_id: PaperId,
    #[validate(length(min = 1, message = "paper_title must not be empty"))]
    pub paper_title: String,
    #[validate(range(min = 1))]
    pub comment_author_id: DbId,
    #[validate(range(min = 1))]
    pub replying_user_id: DbId,
}

impl From<ReplyCreatedRequest> for ReplyCreated {
    fn from(req: ReplyCreatedRequest) -> Self {
        Self {
            paper_id: req.paper_id,
            paper_title: req.paper_title,
            comment_author_id: req.comment_author_id,
            replying_user_id: req.replying_user_id,
        }
    }
}

/// Counts plus per-recipient outcomes for one fan-out.
#[derive(Debug, Serialize)]
pub struct FanOutSummary {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub attempts: Vec<DeliveryAttempt>,
}

impl From<FanOutReport> for FanOutSummary {
    fn from(report: FanOutReport) -> Self {
        Self {
            attempted: report.attempted(),
            delivered: report.delivered(),
            failed: report.failed(),
            attempts: report.attempts,
        }
    }
}

/// The paper a mute link silenced.
#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    pub email: String,
    pub paper_id: PaperId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/comment-created
///
/// Email every earlier participant of the paper. Individual send failures
/// are reported in the summary; only storage failures fail the request.
pub async fn comment_created(
    State(state): State<AppState>,
    Json(body): Json<CommentCreatedRequest>,
) -> AppResult<Json<DataResponse<FanOutSummary>>> {
    body.validate()?;
    let event = CommentCreated::from(body);

    let report = state
        .notifications
        .notify_new_comment(&event)
        .await
        .inspect_err(|e| {
            tracing::error!(paper_id = %event.paper_id, error = %e, "Comment fan-out aborted");
        })?;

    Ok(Json(DataResponse {
        data: report.into(),
    }))
}

/// POST /api/v1/notifications/reply-created
pub async fn reply_created(
    State(state): State<AppState>,
    Json(body): Json<ReplyCreatedRequest>,
) -> AppResult<Json<DataResponse<FanOutSummary>>> {
    body.validate()?;
    let event = ReplyCreated::from(body);

    let report = state.notifications.notify_new_reply(&event).await?;

    Ok(Json(DataResponse {
        data: report.into(),
    }))
}

/// POST /api/v1/notifications/unsubscribe/{token}
///
/// Apply a mute link. Following the same link twice succeeds both times.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<UnsubscribeResponse>>> {
    let muted = state.notifications.unsubscribe(&token).await?;

    Ok(Json(DataResponse {
        data: UnsubscribeResponse {
            email: muted.email,
            paper_id: muted.paper_id,
        },
    }))
}
