//! Route definitions for the `/transports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::transports;
use crate::state::AppState;

/// Routes mounted at `/transports`.
///
/// ```text
/// GET    /    -> list_transports
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(transports::list_transports))
}
