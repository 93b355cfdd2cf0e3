//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`RouteEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application:
//! route lifecycle producers publish, the alert dispatcher subscribes.

use std::fmt;

use kongwatch_core::settings::{FLAG_ROUTE_CREATED, FLAG_ROUTE_UPDATED};
use kongwatch_core::topics::{TOPIC_ROUTE_CREATED, TOPIC_ROUTE_DELETED, TOPIC_ROUTE_UPDATED};
use kongwatch_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use ts_rs::TS;

// ---------------------------------------------------------------------------
// RouteEvent
// ---------------------------------------------------------------------------

/// Which route lifecycle mutation triggered the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RouteEventKind {
    Created,
    Updated,
    Deleted,
}

impl RouteEventKind {
    /// Realtime topic the event is broadcast under.
    pub fn topic(self) -> &'static str {
        match self {
            Self::Created => TOPIC_ROUTE_CREATED,
            Self::Updated => TOPIC_ROUTE_UPDATED,
            Self::Deleted => TOPIC_ROUTE_DELETED,
        }
    }

    /// Policy flag consulted by the delivery gate.
    ///
    /// Deletions share the update flag: the settings schema has no
    /// `route_deleted` switch, so `route_updated` governs both.
    pub fn policy_flag(self) -> &'static str {
        match self {
            Self::Created => FLAG_ROUTE_CREATED,
            Self::Updated | Self::Deleted => FLAG_ROUTE_UPDATED,
        }
    }

    /// Past-tense English verb, used in email headings and logs.
    pub fn action(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RouteEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

/// Point-in-time copy of the route the event concerns.
///
/// Kong leaves most route fields optional, so consumers render a fallback
/// instead of relying on any of them being present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RouteSnapshot {
    /// Kong route id.
    pub id: String,
    pub name: Option<String>,
    pub paths: Option<Vec<String>>,
    /// Id of the service the route is attached to.
    pub service_id: Option<String>,
}

/// The Kong connection (cluster/node) the event originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ConnectionRef {
    pub name: String,
}

/// The acting user, when the mutation was performed by a signed-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserRef {
    pub username: String,
}

/// A route lifecycle event.
///
/// Constructed via [`RouteEvent::new`] at the moment of the domain mutation
/// and optionally enriched with [`with_actor`](RouteEvent::with_actor).
/// Immutable from then on; every downstream consumer reads, none mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RouteEvent {
    pub kind: RouteEventKind,
    pub route: RouteSnapshot,
    pub connection: ConnectionRef,
    pub actor: Option<UserRef>,
    /// When the mutation happened (UTC).
    pub occurred_at: Timestamp,
}

impl RouteEvent {
    /// Create a new event for the given mutation. The actor defaults to
    /// `None`, rendered downstream as "System".
    pub fn new(kind: RouteEventKind, route: RouteSnapshot, connection: ConnectionRef) -> Self {
        Self {
            kind,
            route,
            connection,
            actor: None,
            occurred_at: chrono::Utc::now(),
        }
    }

    /// Attach the acting user to the event.
    pub fn with_actor(mut self, actor: UserRef) -> Self {
        self.actor = Some(actor);
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`RouteEvent`].
///
/// # Usage
///
/// ```rust
/// use kongwatch_events::bus::{ConnectionRef, EventBus, RouteEvent, RouteEventKind, RouteSnapshot};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RouteEvent::new(
///     RouteEventKind::Created,
///     RouteSnapshot {
///         id: "9d0c2f0e".into(),
///         name: Some("payments".into()),
///         paths: None,
///         service_id: None,
///     },
///     ConnectionRef { name: "production".into() },
/// ));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RouteEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: RouteEvent) {
        // A SendError only means there are zero receivers right now.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RouteEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
