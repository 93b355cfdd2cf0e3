//! Handlers for the `/transports` resource.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use kongwatch_db::repositories::EmailTransportRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /transports
// ---------------------------------------------------------------------------

/// List the stored email transport records so the admin UI can offer the
/// configured names for `default_transport`.
pub async fn list_transports(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let transports = EmailTransportRepo::list(&state.pool).await?;

    tracing::debug!(count = transports.len(), "Listed email transports");

    Ok(Json(DataResponse { data: transports }))
}
