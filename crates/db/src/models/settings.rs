//! Settings entity model.

use kongwatch_core::settings::SettingsData;
use kongwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use ts_rs::TS;

/// The singleton row from the `settings` table. The `data` column is JSONB
/// and deserializes into the typed blob shared across the workspace.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct Settings {
    pub id: DbId,
    #[sqlx(json)]
    pub data: SettingsData,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
