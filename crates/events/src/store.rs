//! Storage access for the alert dispatcher.
//!
//! [`AlertStore`] is the narrow slice of the database the dispatcher needs,
//! behind a trait so tests can swap in an in-memory double. Everything is
//! fetched fresh per dispatched event rather than cached: a settings change
//! in the admin UI takes effect on the very next route event.

use async_trait::async_trait;
use kongwatch_core::SettingsData;
use kongwatch_db::models::email_transport::EmailTransport;
use kongwatch_db::repositories::{EmailTransportRepo, SettingsRepo, UserRepo};
use kongwatch_db::DbPool;

/// Read-only queries the dispatcher runs while handling one event.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// The delivery settings blob, if the singleton row exists.
    async fn delivery_settings(&self) -> Result<Option<SettingsData>, sqlx::Error>;

    /// The stored transport record matching `name`.
    async fn email_transport(&self, name: &str) -> Result<Option<EmailTransport>, sqlx::Error>;

    /// Email addresses of all administrator accounts.
    async fn admin_emails(&self) -> Result<Vec<String>, sqlx::Error>;
}

/// Postgres-backed [`AlertStore`] over the shared connection pool.
pub struct PgAlertStore {
    pool: DbPool,
}

impl PgAlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn delivery_settings(&self) -> Result<Option<SettingsData>, sqlx::Error> {
        let row = SettingsRepo::get(&self.pool).await?;
        Ok(row.map(|settings| settings.data))
    }

    async fn email_transport(&self, name: &str) -> Result<Option<EmailTransport>, sqlx::Error> {
        EmailTransportRepo::find_by_name(&self.pool, name).await
    }

    async fn admin_emails(&self) -> Result<Vec<String>, sqlx::Error> {
        UserRepo::admin_emails(&self.pool).await
    }
}
