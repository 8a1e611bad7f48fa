use std::sync::Arc;

use marginalia_notify::NotificationService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: marginalia_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Recipient resolution, formatting, dispatch and mute links.
    pub notifications: Arc<NotificationService>,
}
