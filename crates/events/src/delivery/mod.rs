//! External delivery channels for route alerts.
//!
//! This module provides the Slack chat and email delivery services used by
//! the alert dispatcher to push events outside the platform.

pub mod email;
pub mod slack;
