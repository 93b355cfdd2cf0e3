pub mod health;
pub mod settings;
pub mod transports;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws              WebSocket (realtime route alerts)
///
/// /settings        get, replace delivery settings (GET, PUT)
///
/// /transports      list stored email transports (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint for realtime route alerts.
        .route("/ws", get(ws::ws_handler))
        // Delivery settings singleton.
        .nest("/settings", settings::router())
        // Stored email transport records.
        .nest("/transports", transports::router())
}
