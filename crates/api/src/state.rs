use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kongwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (admin UI clients).
    pub ws_manager: Arc<WsManager>,
    /// Event bus; route lifecycle producers publish here and the alert
    /// dispatcher consumes.
    pub event_bus: Arc<kongwatch_events::EventBus>,
}
