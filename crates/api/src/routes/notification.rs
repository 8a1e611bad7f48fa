//! Route definitions for the `/notifications` resource.
//!
//! The activity hooks are called by the comment service after it persists a
//! comment or reply; the unsubscribe route is called by the frontend when a
//! user follows a mute link.

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /comment-created        -> comment_created
/// POST   /reply-created          -> reply_created
/// POST   /unsubscribe/{token}    -> unsubscribe   (browser, CORS)
/// ```
pub fn router(cors: CorsLayer) -> Router<AppState> {
    Router::new()
        .route("/comment-created", post(notification::comment_created))
        .route("/reply-created", post(notification::reply_created))
        .route(
            "/unsubscribe/{token}",
            post(notification::unsubscribe).layer(cors),
        )
}
