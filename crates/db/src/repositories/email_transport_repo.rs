//! Repository for the `email_transports` table.

use sqlx::PgPool;

use crate::models::email_transport::EmailTransport;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, settings, created_at, updated_at";

/// Provides lookups for stored email transport configurations.
pub struct EmailTransportRepo;

impl EmailTransportRepo {
    /// Find a transport record by its unique name. Absence is a normal
    /// outcome: it means email delivery is not configured for that name.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EmailTransport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_transports WHERE name = $1");
        sqlx::query_as::<_, EmailTransport>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all stored transports, for the admin UI.
    pub async fn list(pool: &PgPool) -> Result<Vec<EmailTransport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_transports ORDER BY name");
        sqlx::query_as::<_, EmailTransport>(&query)
            .fetch_all(pool)
            .await
    }
}
