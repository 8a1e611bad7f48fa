pub mod health;
pub mod notification;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /notifications/comment-created        fan out a new comment (POST)
/// /notifications/reply-created          notify a comment's author (POST)
/// /notifications/unsubscribe/{token}    apply a mute link (POST, CORS)
/// ```
pub fn api_routes(cors: CorsLayer) -> Router<AppState> {
    Router::new().nest("/notifications", notification::router(cors))
}
