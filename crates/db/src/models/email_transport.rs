//! Email transport entity model.

use kongwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `email_transports` table. `settings` stays untyped here;
/// each transport family parses its own shape when a mailer is built.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct EmailTransport {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub settings: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
