//! Well-known realtime broadcast topic constants.
//!
//! These must match the topic values the admin UI subscribes to; every
//! frame pushed to WebSocket clients carries one of them in its `topic`
//! field.

/// A route was created on a connected Kong node.
pub const TOPIC_ROUTE_CREATED: &str = "route.created";

/// A route was updated on a connected Kong node.
pub const TOPIC_ROUTE_UPDATED: &str = "route.updated";

/// A route was deleted from a connected Kong node.
pub const TOPIC_ROUTE_DELETED: &str = "route.deleted";
