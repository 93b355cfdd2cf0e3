//! Pure message composition.
//!
//! Turns one [`RouteEvent`] into the two channel representations: a Slack
//! block-kit message for the chat leg and an HTML table for the email leg.
//! No I/O happens here; given a fixed clock the output is deterministic,
//! which is what the tests rely on.

use kongwatch_core::types::Timestamp;
use serde::Serialize;

use crate::bus::{RouteEvent, RouteEventKind};

/// Rendered when an optional field is absent.
const FALLBACK: &str = "N/A";

/// Rendered as the author when no signed-in user triggered the mutation.
const SYSTEM_AUTHOR: &str = "System";

/// Timestamp format for the Slack field grid.
const SLACK_DATE_FORMAT: &str = "%d/%m/%Y @%H:%M:%S";

/// Timestamp format for the email table.
const EMAIL_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

// ---------------------------------------------------------------------------
// Block model
// ---------------------------------------------------------------------------

/// A Slack text object, either plain or mrkdwn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// One Slack layout block. Only the block types the composer emits are
/// modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section { fields: Vec<TextObject> },
    Divider,
    Context { elements: Vec<TextObject> },
}

/// A composed chat message: summary text plus the block sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    pub text: String,
    pub blocks: Vec<Block>,
}

// ---------------------------------------------------------------------------
// Composers
// ---------------------------------------------------------------------------

/// Compose the Slack representation of a route event.
///
/// `dashboard_url` is the externally reachable UI address shown in the
/// context line; it renders as `N/A` when unset.
pub fn slack_message(event: &RouteEvent, dashboard_url: Option<&str>) -> SlackMessage {
    slack_message_at(event, dashboard_url, chrono::Utc::now())
}

/// Compose the email HTML representation of a route event.
pub fn email_html(event: &RouteEvent) -> String {
    email_html_at(event, chrono::Utc::now())
}

/// Email subject line per event kind.
pub fn email_subject(kind: RouteEventKind) -> &'static str {
    match kind {
        RouteEventKind::Created => "New Route Created in Kong",
        RouteEventKind::Updated => "Route updated in Kong",
        RouteEventKind::Deleted => "Route deleted in Kong",
    }
}

/// Header title per event kind. Localized, matching the admin UI language.
fn header_title(kind: RouteEventKind) -> &'static str {
    match kind {
        RouteEventKind::Created => "Rota Criada",
        RouteEventKind::Updated => "Rota Atualizada",
        RouteEventKind::Deleted => "Rota Removida",
    }
}

/// Heading color per event kind (green / amber / red).
fn heading_color(kind: RouteEventKind) -> &'static str {
    match kind {
        RouteEventKind::Created => "#28a745",
        RouteEventKind::Updated => "#ffc107",
        RouteEventKind::Deleted => "#dc3545",
    }
}

/// Route name for display. An empty name is treated like a missing one.
fn display_name(event: &RouteEvent) -> &str {
    event
        .route
        .name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK)
}

/// Joined paths for display. A present-but-empty path list renders as an
/// empty string, only a missing list falls back to `N/A`.
fn display_paths(event: &RouteEvent) -> String {
    event
        .route
        .paths
        .as_ref()
        .map(|p| p.join(", "))
        .unwrap_or_else(|| FALLBACK.to_string())
}

fn display_service(event: &RouteEvent) -> &str {
    event.route.service_id.as_deref().unwrap_or(FALLBACK)
}

fn display_author(event: &RouteEvent) -> &str {
    event
        .actor
        .as_ref()
        .map(|u| u.username.as_str())
        .unwrap_or(SYSTEM_AUTHOR)
}

fn slack_message_at(event: &RouteEvent, dashboard_url: Option<&str>, now: Timestamp) -> SlackMessage {
    let action = event.kind.action();
    let connection = &event.connection.name;

    SlackMessage {
        text: format!("Uma rota foi *{action}* no Kong *{connection}*"),
        blocks: vec![
            Block::Header {
                text: TextObject::plain(header_title(event.kind)),
            },
            Block::Section {
                fields: vec![
                    TextObject::mrkdwn(format!(
                        "*Data/Hora:*\n{}",
                        now.format(SLACK_DATE_FORMAT)
                    )),
                    TextObject::mrkdwn(format!("*Route:*\n{}", display_name(event))),
                    TextObject::mrkdwn(format!("*Service:*\n{}", display_service(event))),
                    TextObject::mrkdwn(format!("*Cluster:*\n{connection}")),
                    TextObject::mrkdwn(format!("*Autor:*\n{}", display_author(event))),
                    TextObject::mrkdwn(format!("*Paths:*\n{}", display_paths(event))),
                ],
            },
            Block::Divider,
            Block::Context {
                elements: vec![TextObject::mrkdwn(format!(
                    "Route ID: `{}` | Kongwatch: {}",
                    event.route.id,
                    dashboard_url.unwrap_or(FALLBACK)
                ))],
            },
        ],
    }
}

fn email_html_at(event: &RouteEvent, now: Timestamp) -> String {
    let timestamp = now.format(EMAIL_DATE_FORMAT).to_string();
    let paths = display_paths(event);

    let mut rows = String::new();
    for (label, value) in [
        ("Route ID", event.route.id.as_str()),
        ("Name", display_name(event)),
        ("Paths", paths.as_str()),
        ("Service ID", display_service(event)),
        ("Kong Node", event.connection.name.as_str()),
        ("Created by", display_author(event)),
        ("Timestamp", timestamp.as_str()),
    ] {
        rows.push_str(&format!(
            "<tr>\
             <td style=\"padding: 8px; border: 1px solid #ccc;\"><strong>{label}</strong></td>\
             <td style=\"padding: 8px; border: 1px solid #ccc;\">{value}</td>\
             </tr>"
        ));
    }

    format!(
        "<h3 style=\"color: {};\">A Route has been {} in Kong</h3>\
         <table style=\"border: 1px solid #ccc; background-color: #f8f9fa; \
         border-collapse: collapse; width: 100%;\">\
         <tr style=\"background-color: #e9ecef;\">\
         <th style=\"text-align: left; padding: 8px; border: 1px solid #ccc;\">Property</th>\
         <th style=\"text-align: left; padding: 8px; border: 1px solid #ccc;\">Value</th>\
         </tr>{rows}</table>",
        heading_color(event.kind),
        event.kind.action(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
