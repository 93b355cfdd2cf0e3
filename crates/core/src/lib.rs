//! Shared vocabulary for the Kongwatch workspace.
//!
//! Leaf crate with no I/O: primitive type aliases, realtime topic constants,
//! and the typed shape of the singleton delivery-settings record that the
//! dispatcher, persistence layer, and admin API all read.

pub mod settings;
pub mod topics;
pub mod types;

pub use settings::SettingsData;
pub use types::{DbId, Timestamp};
