//! Repository for the singleton `settings` table.

use kongwatch_core::settings::SettingsData;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::settings::Settings;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, data, created_at, updated_at";

/// Provides read/replace access to the settings singleton.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Fetch the settings record. The table holds at most one meaningful
    /// row; the first row by id wins, matching how every consumer reads it.
    pub async fn get(pool: &PgPool) -> Result<Option<Settings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings ORDER BY id LIMIT 1");
        sqlx::query_as::<_, Settings>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Replace the settings data blob, creating the row if migrations ever
    /// left the table empty.
    pub async fn upsert(pool: &PgPool, data: &SettingsData) -> Result<Settings, sqlx::Error> {
        let update = format!(
            "UPDATE settings SET data = $1, updated_at = NOW() \
             WHERE id = (SELECT id FROM settings ORDER BY id LIMIT 1) \
             RETURNING {COLUMNS}"
        );
        if let Some(row) = sqlx::query_as::<_, Settings>(&update)
            .bind(Json(data))
            .fetch_optional(pool)
            .await?
        {
            return Ok(row);
        }

        let insert = format!("INSERT INTO settings (data) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Settings>(&insert)
            .bind(Json(data))
            .fetch_one(pool)
            .await
    }
}
