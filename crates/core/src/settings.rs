//! Typed shape of the singleton delivery-settings record.
//!
//! The settings row stores a single JSONB `data` column that the admin UI
//! edits as one blob. Rows written by older versions may predate any given
//! field, so every field deserializes with a default instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Policy flag consulted for route creation events.
pub const FLAG_ROUTE_CREATED: &str = "route_created";

/// Policy flag consulted for route update and route deletion events.
pub const FLAG_ROUTE_UPDATED: &str = "route_updated";

/// Integration id of the Slack chat integration.
pub const INTEGRATION_SLACK: &str = "slack";

/// Field id of the Slack bot token (rich API path).
pub const FIELD_SLACK_BOT_TOKEN: &str = "slack_bot_token";

/// Field id of the Slack channel to post to.
pub const FIELD_SLACK_CHANNEL: &str = "slack_channel";

/// Field id of the fallback incoming-webhook URL.
pub const FIELD_SLACK_WEBHOOK_URL: &str = "slack_webhook_url";

/// Channel used when the Slack integration does not configure one.
pub const DEFAULT_SLACK_CHANNEL: &str = "#general";

/// Transport family: SMTP relay.
pub const TRANSPORT_SMTP: &str = "smtp";

/// Transport family: Mailgun HTTP API.
pub const TRANSPORT_MAILGUN: &str = "mailgun";

/// Transport family: local sendmail binary.
pub const TRANSPORT_SENDMAIL: &str = "sendmail";

// ---------------------------------------------------------------------------
// Data shape
// ---------------------------------------------------------------------------

/// The `data` blob of the singleton settings row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettingsData {
    /// Per-event-kind notification switches, keyed by policy flag
    /// (`route_created`, `route_updated`).
    #[serde(default)]
    pub notify_when: BTreeMap<String, NotifyToggle>,

    /// Configured third-party integrations (currently only Slack).
    #[serde(default)]
    pub integrations: Vec<IntegrationConfig>,

    /// Whether email delivery is enabled at all. Recorded alongside the
    /// transport name when resolving a mailer.
    #[serde(default)]
    pub email_notifications: bool,

    /// Name of the email transport record to deliver through.
    #[serde(default)]
    pub default_transport: String,

    /// Display name for the `From` mailbox.
    #[serde(default)]
    pub email_default_sender_name: String,

    /// Address for the `From` mailbox.
    #[serde(default)]
    pub email_default_sender: String,
}

/// One `notify_when` switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NotifyToggle {
    #[serde(default)]
    pub active: bool,
}

/// One configured integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IntegrationConfig {
    /// Integration id, e.g. `slack`.
    pub id: String,

    #[serde(default)]
    pub config: IntegrationSettings,
}

/// Integration on/off switch plus its field values, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl SettingsData {
    /// Look up an integration by id. Order-independent.
    pub fn integration(&self, id: &str) -> Option<&IntegrationConfig> {
        self.integrations.iter().find(|i| i.id == id)
    }

    /// Whether the given policy flag exists and is active.
    pub fn notify_flag_active(&self, flag: &str) -> bool {
        self.notify_when.get(flag).map(|t| t.active).unwrap_or(false)
    }
}

impl IntegrationSettings {
    /// Look up a field value by id. An empty string is treated as unset, so
    /// a cleared form field behaves the same as a missing one.
    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields
            .get(id)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slack_settings(fields: &[(&str, &str)]) -> SettingsData {
        SettingsData {
            integrations: vec![IntegrationConfig {
                id: INTEGRATION_SLACK.to_string(),
                config: IntegrationSettings {
                    enabled: true,
                    fields: fields
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                },
            }],
            ..SettingsData::default()
        }
    }

    #[test]
    fn deserializes_missing_fields_with_defaults() {
        let data: SettingsData = serde_json::from_str("{}").unwrap();
        assert!(data.notify_when.is_empty());
        assert!(data.integrations.is_empty());
        assert!(!data.email_notifications);
        assert_eq!(data.default_transport, "");
    }

    #[test]
    fn deserializes_full_blob() {
        let data: SettingsData = serde_json::from_value(serde_json::json!({
            "notify_when": {
                "route_created": { "active": true },
                "route_updated": { "active": false }
            },
            "integrations": [{
                "id": "slack",
                "config": {
                    "enabled": true,
                    "fields": { "slack_channel": "#ops" }
                }
            }],
            "email_notifications": true,
            "default_transport": "smtp",
            "email_default_sender_name": "Kongwatch",
            "email_default_sender": "alerts@example.com"
        }))
        .unwrap();

        assert!(data.notify_flag_active(FLAG_ROUTE_CREATED));
        assert!(!data.notify_flag_active(FLAG_ROUTE_UPDATED));
        let slack = data.integration(INTEGRATION_SLACK).unwrap();
        assert_eq!(slack.config.field(FIELD_SLACK_CHANNEL), Some("#ops"));
        assert_eq!(data.default_transport, "smtp");
    }

    #[test]
    fn absent_flag_is_inactive() {
        let data = SettingsData::default();
        assert!(!data.notify_flag_active(FLAG_ROUTE_CREATED));
    }

    #[test]
    fn empty_field_value_is_unset() {
        let data = slack_settings(&[
            (FIELD_SLACK_BOT_TOKEN, ""),
            (FIELD_SLACK_WEBHOOK_URL, "https://hooks.example.com/x"),
        ]);
        let config = &data.integration(INTEGRATION_SLACK).unwrap().config;
        assert_eq!(config.field(FIELD_SLACK_BOT_TOKEN), None);
        assert_eq!(
            config.field(FIELD_SLACK_WEBHOOK_URL),
            Some("https://hooks.example.com/x")
        );
    }

    #[test]
    fn unknown_integration_is_none() {
        let data = slack_settings(&[]);
        assert!(data.integration("pagerduty").is_none());
    }
}
