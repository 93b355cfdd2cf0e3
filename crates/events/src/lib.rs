//! Kongwatch event bus and route alert dispatch.
//!
//! Building blocks for turning Kong route lifecycle events into
//! notifications:
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RouteEvent`]: the canonical route lifecycle event envelope.
//! - [`compose`]: pure message composition (Slack blocks, email HTML).
//! - [`delivery`]: external delivery channels (Slack chat, email).
//! - [`RouteAlertDispatcher`]: per-event orchestration of the chat, email,
//!   and realtime legs behind the delivery policy gate.

pub mod bus;
pub mod compose;
pub mod delivery;
pub mod dispatcher;
pub mod store;

pub use bus::{ConnectionRef, EventBus, RouteEvent, RouteEventKind, RouteSnapshot, UserRef};
pub use dispatcher::{should_notify, RealtimeBroadcaster, RouteAlertDispatcher};
pub use store::{AlertStore, PgAlertStore};
