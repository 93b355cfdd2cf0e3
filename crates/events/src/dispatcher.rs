//! Fans route events out to the delivery channels.
//!
//! [`RouteAlertDispatcher`] subscribes to the event bus and, for each event
//! that passes the notification policy, runs three independent legs: the
//! Slack message, the admin email, and a realtime frame for connected live
//! clients. Each leg is its own task; one failing or hanging never blocks
//! the others, and nothing flows back to whoever published the event.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kongwatch_core::SettingsData;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::bus::{RouteEvent, RouteEventKind};
use crate::compose::{self, SlackMessage};
use crate::delivery::email::EmailDelivery;
use crate::delivery::slack::SlackDelivery;
use crate::store::AlertStore;

/// Push side of the realtime channel.
///
/// The HTTP layer implements this on its WebSocket connection manager;
/// tests use a recording double.
#[async_trait]
pub trait RealtimeBroadcaster: Send + Sync {
    /// Deliver one serialized frame to every connected client.
    async fn broadcast(&self, frame: String);
}

/// The single policy gate shared by all three legs.
///
/// Returns false when the settings record is absent or the flag governing
/// `kind` is missing or inactive. A false here means no chat call, no
/// email, and no realtime broadcast for this event.
pub fn should_notify(settings: Option<&SettingsData>, kind: RouteEventKind) -> bool {
    settings
        .map(|data| data.notify_flag_active(kind.policy_flag()))
        .unwrap_or(false)
}

/// Consumes route events from the bus and dispatches alerts.
pub struct RouteAlertDispatcher {
    store: Arc<dyn AlertStore>,
    realtime: Arc<dyn RealtimeBroadcaster>,
    slack: SlackDelivery,
    /// Absolute dashboard URL shown in the Slack context line, when set.
    dashboard_url: Option<String>,
}

impl RouteAlertDispatcher {
    pub fn new(
        store: Arc<dyn AlertStore>,
        realtime: Arc<dyn RealtimeBroadcaster>,
        dashboard_url: Option<String>,
    ) -> Self {
        Self {
            store,
            realtime,
            slack: SlackDelivery::new(),
            dashboard_url,
        }
    }

    /// Run the main dispatch loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<RouteEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.dispatch(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Alert dispatcher lagged, some alerts were lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, alert dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Handle a single event: evaluate the policy once, then fan out.
    pub async fn dispatch(&self, event: RouteEvent) {
        tracing::info!(
            kind = %event.kind,
            route_id = %event.route.id,
            "Route event received"
        );

        let settings = match self.store.delivery_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load delivery settings, dropping alert");
                return;
            }
        };

        if !should_notify(settings.as_ref(), event.kind) {
            tracing::info!(
                kind = %event.kind,
                flag = event.kind.policy_flag(),
                "Route notifications are disabled"
            );
            return;
        }
        // The gate only passes when the record exists.
        let Some(data) = settings else { return };

        let message = compose::slack_message(&event, self.dashboard_url.as_deref());
        let html = compose::email_html(&event);

        let chat = self.spawn_chat_leg(data.clone(), message);
        let email = self.spawn_email_leg(data, event.kind, html);
        let realtime = self.spawn_realtime_leg(&event);

        for (leg, handle) in [("chat", chat), ("email", email), ("realtime", realtime)] {
            if let Err(e) = handle.await {
                tracing::error!(leg, error = %e, "Delivery leg panicked");
            }
        }
    }

    fn spawn_chat_leg(&self, settings: SettingsData, message: SlackMessage) -> JoinHandle<()> {
        let slack = self.slack.clone();
        tokio::spawn(async move {
            match slack.send(&settings, &message).await {
                Ok(outcome) => tracing::debug!(?outcome, "Chat leg finished"),
                Err(e) => tracing::error!(error = %e, "Slack delivery failed"),
            }
        })
    }

    fn spawn_email_leg(
        &self,
        settings: SettingsData,
        kind: RouteEventKind,
        html: String,
    ) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let recipients = match store.admin_emails().await {
                Ok(recipients) => recipients,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Failed to resolve administrator recipients, skipping email leg"
                    );
                    return;
                }
            };
            let transport = match store.email_transport(&settings.default_transport).await {
                Ok(transport) => transport,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load email transport, skipping email leg");
                    return;
                }
            };
            match EmailDelivery::send(&settings, transport.as_ref(), kind, &html, &recipients).await
            {
                Ok(outcome) => tracing::debug!(?outcome, "Email leg finished"),
                Err(e) => tracing::error!(error = %e, "Email delivery failed"),
            }
        })
    }

    fn spawn_realtime_leg(&self, event: &RouteEvent) -> JoinHandle<()> {
        let realtime = Arc::clone(&self.realtime);
        let frame = serde_json::json!({
            "topic": event.kind.topic(),
            "route": &event.route,
            "connection": &event.connection,
            "user": &event.actor,
            "timestamp": Utc::now(),
        })
        .to_string();
        tokio::spawn(async move {
            realtime.broadcast(frame).await;
            tracing::debug!("Realtime frame broadcast to live clients");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use kongwatch_core::settings::{NotifyToggle, FLAG_ROUTE_CREATED, FLAG_ROUTE_UPDATED};

    use super::*;

    fn settings_with_flag(flag: &str, active: bool) -> SettingsData {
        let mut notify_when = BTreeMap::new();
        notify_when.insert(flag.to_string(), NotifyToggle { active });
        SettingsData {
            notify_when,
            ..SettingsData::default()
        }
    }

    #[test]
    fn absent_settings_disable_everything() {
        assert!(!should_notify(None, RouteEventKind::Created));
        assert!(!should_notify(None, RouteEventKind::Updated));
        assert!(!should_notify(None, RouteEventKind::Deleted));
    }

    #[test]
    fn missing_flag_means_disabled() {
        let data = SettingsData::default();
        assert!(!should_notify(Some(&data), RouteEventKind::Created));
    }

    #[test]
    fn inactive_flag_means_disabled() {
        let data = settings_with_flag(FLAG_ROUTE_CREATED, false);
        assert!(!should_notify(Some(&data), RouteEventKind::Created));
    }

    #[test]
    fn active_flag_enables_matching_kind_only() {
        let data = settings_with_flag(FLAG_ROUTE_CREATED, true);
        assert!(should_notify(Some(&data), RouteEventKind::Created));
        assert!(!should_notify(Some(&data), RouteEventKind::Updated));
    }

    #[test]
    fn deleted_events_gated_by_update_flag() {
        let data = settings_with_flag(FLAG_ROUTE_UPDATED, true);
        assert!(should_notify(Some(&data), RouteEventKind::Deleted));
        assert!(should_notify(Some(&data), RouteEventKind::Updated));
        assert!(!should_notify(Some(&data), RouteEventKind::Created));
    }
}
