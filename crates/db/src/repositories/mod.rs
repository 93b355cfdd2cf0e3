//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod email_transport_repo;
pub mod settings_repo;
pub mod user_repo;

pub use email_transport_repo::EmailTransportRepo;
pub use settings_repo::SettingsRepo;
pub use user_repo::UserRepo;
