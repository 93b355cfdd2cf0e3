//! HTTP handler functions, one module per resource.

pub mod settings;
pub mod transports;
