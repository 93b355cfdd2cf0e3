//! Handlers for the `/settings` resource.
//!
//! The settings row is the delivery policy for the whole dispatcher:
//! notification switches, Slack integration fields, and the email transport
//! selection all live in its `data` blob.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use kongwatch_core::settings::SettingsData;
use kongwatch_db::repositories::SettingsRepo;
use validator::ValidateEmail;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /settings
// ---------------------------------------------------------------------------

/// Get the singleton settings record, or `null` when none has been stored.
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = SettingsRepo::get(&state.pool).await?;

    Ok(Json(DataResponse { data: settings }))
}

// ---------------------------------------------------------------------------
// PUT /settings
// ---------------------------------------------------------------------------

/// Replace the settings data blob.
///
/// The dispatcher reads settings fresh per event, so the new values take
/// effect on the very next route alert.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<SettingsData>,
) -> AppResult<impl IntoResponse> {
    // An empty sender is allowed (email stays unconfigured); a non-empty one
    // must parse, or every alert email would fail at the transport.
    if !input.email_default_sender.is_empty() && !input.email_default_sender.validate_email() {
        return Err(AppError::Validation(format!(
            "email_default_sender is not a valid email address: {}",
            input.email_default_sender
        )));
    }

    let settings = SettingsRepo::upsert(&state.pool, &input).await?;

    tracing::info!(settings_id = settings.id, "Delivery settings updated");

    Ok(Json(DataResponse { data: settings }))
}
