//! Repository for the `users` table.
//!
//! The dispatcher only ever needs administrator email addresses out of the
//! user directory, so this stays a scalar query with no row model.

use sqlx::PgPool;

/// Provides lookups against the user directory.
pub struct UserRepo;

impl UserRepo {
    /// Email addresses of every account flagged administrator, in id order.
    /// An empty list is a normal outcome, not an error.
    pub async fn admin_emails(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE admin = true ORDER BY id")
            .fetch_all(pool)
            .await
    }
}
