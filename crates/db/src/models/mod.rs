//! Row models.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus any DTOs the admin API needs.

pub mod email_transport;
pub mod settings;
