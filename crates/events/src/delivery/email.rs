//! Email delivery through stored, named transports.
//!
//! Unlike a fixed SMTP setup, the transport is chosen per send: the settings
//! blob names a transport, the matching [`EmailTransport`] record supplies
//! provider-specific config, and [`Mailer::resolve`] builds a one-shot
//! sender for that family (SMTP relay, Mailgun HTTP API, or the local
//! sendmail binary). Because a mailer is built per call, repointing
//! `default_transport` takes effect on the very next alert.
//!
//! The mere existence of the stored record gates the whole channel, even
//! for sendmail which consumes no settings from it.

use std::time::Duration;

use kongwatch_core::settings::{
    SettingsData, TRANSPORT_MAILGUN, TRANSPORT_SENDMAIL, TRANSPORT_SMTP,
};
use kongwatch_db::models::email_transport::EmailTransport;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use crate::bus::RouteEventKind;
use crate::compose;

/// Mailgun API host used when the transport record does not override it
/// (EU-hosted domains store `api.eu.mailgun.net`).
const MAILGUN_API_HOST: &str = "api.mailgun.net";

/// HTTP request timeout for a Mailgun API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The local sendmail submission failed.
    #[error("Sendmail transport error: {0}")]
    Sendmail(#[from] lettre::transport::sendmail::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The stored transport record carries settings the family cannot parse.
    #[error("Invalid {family} transport settings: {source}")]
    Settings {
        family: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The Mailgun HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Mailgun returned a non-2xx status code.
    #[error("Mailgun returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Provider settings shapes
// ---------------------------------------------------------------------------

/// SMTP transport record settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    /// Overrides the family default (465 for implicit TLS, 587 otherwise).
    #[serde(default)]
    pub port: Option<u16>,
    /// Implicit TLS instead of STARTTLS.
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub auth: Option<SmtpAuth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpAuth {
    pub user: String,
    pub pass: String,
}

/// Mailgun transport record settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailgunSettings {
    pub auth: MailgunAuth,
    /// API host override, e.g. `api.eu.mailgun.net`.
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailgunAuth {
    pub api_key: String,
    pub domain: String,
}

// ---------------------------------------------------------------------------
// Transport factory
// ---------------------------------------------------------------------------

/// A ready-to-send mailer for one transport family.
enum Mailer {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Mailgun {
        client: reqwest::Client,
        settings: MailgunSettings,
    },
    Sendmail(AsyncSendmailTransport<Tokio1Executor>),
}

impl Mailer {
    /// Build a mailer from a stored transport record, keyed by its name.
    ///
    /// `Ok(None)` means the name matches no known family; the caller logs
    /// and skips the channel.
    fn resolve(record: &EmailTransport) -> Result<Option<Self>, EmailError> {
        match record.name.as_str() {
            TRANSPORT_SMTP => {
                let settings: SmtpSettings = serde_json::from_value(record.settings.clone())
                    .map_err(|e| EmailError::Settings {
                        family: TRANSPORT_SMTP,
                        source: e,
                    })?;

                let mut builder = if settings.secure {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
                };
                if let Some(port) = settings.port {
                    builder = builder.port(port);
                }
                if let Some(auth) = settings.auth {
                    builder = builder.credentials(Credentials::new(auth.user, auth.pass));
                }
                Ok(Some(Self::Smtp(builder.build())))
            }
            TRANSPORT_MAILGUN => {
                let settings: MailgunSettings = serde_json::from_value(record.settings.clone())
                    .map_err(|e| EmailError::Settings {
                        family: TRANSPORT_MAILGUN,
                        source: e,
                    })?;
                let client = reqwest::Client::builder()
                    .timeout(REQUEST_TIMEOUT)
                    .build()
                    .expect("Failed to build reqwest HTTP client");
                Ok(Some(Self::Mailgun { client, settings }))
            }
            TRANSPORT_SENDMAIL => Ok(Some(Self::Sendmail(AsyncSendmailTransport::new()))),
            _ => Ok(None),
        }
    }

    /// Send one message through whichever path this mailer wraps.
    async fn send(
        &self,
        from: Mailbox,
        recipients: &[String],
        subject: &str,
        html: &str,
    ) -> Result<(), EmailError> {
        match self {
            Self::Smtp(transport) => {
                let email = build_message(from, recipients, subject, html)?;
                transport.send(email).await?;
                Ok(())
            }
            Self::Sendmail(transport) => {
                let email = build_message(from, recipients, subject, html)?;
                transport.send(email).await?;
                Ok(())
            }
            Self::Mailgun { client, settings } => {
                let host = settings.host.as_deref().unwrap_or(MAILGUN_API_HOST);
                let url = format!("https://{host}/v3/{}/messages", settings.auth.domain);
                let form = [
                    ("from", from.to_string()),
                    ("to", recipients.join(",")),
                    ("subject", subject.to_string()),
                    ("html", html.to_string()),
                ];

                let response = client
                    .post(&url)
                    .basic_auth("api", Some(&settings.auth.api_key))
                    .form(&form)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(EmailError::HttpStatus(response.status().as_u16()));
                }
                Ok(())
            }
        }
    }
}

/// Assemble the MIME message shared by the lettre-backed paths.
fn build_message(
    from: Mailbox,
    recipients: &[String],
    subject: &str,
    html: &str,
) -> Result<Message, EmailError> {
    let mut builder = Message::builder()
        .from(from)
        .subject(subject)
        .header(ContentType::TEXT_HTML);
    for recipient in recipients {
        builder = builder.to(recipient.parse()?);
    }
    builder
        .body(html.to_string())
        .map_err(|e| EmailError::Build(e.to_string()))
}

/// The `From` mailbox, `"Sender Name" <address>`. An empty display name is
/// omitted rather than rendered as empty quotes.
fn sender_mailbox(name: &str, address: &str) -> Result<Mailbox, EmailError> {
    Ok(Mailbox::new(
        (!name.is_empty()).then(|| name.to_string()),
        address.parse()?,
    ))
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// What a send attempt actually did. Every variant except an `Err` from the
/// transport layer is a normal, logged outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    /// No transport record stored under the configured name.
    NoTransport,
    /// The record's name matches no known provider family.
    UnknownTransport,
    /// Nobody to address: the administrator list came back empty.
    NoRecipients,
    Sent,
}

/// Sends route alert emails through the stored transport configuration.
pub struct EmailDelivery;

impl EmailDelivery {
    /// Run the email leg for one event.
    ///
    /// The gates apply in order: stored record, known family, non-empty
    /// recipient list. Each miss is a no-op outcome, not an error.
    pub async fn send(
        settings: &SettingsData,
        transport: Option<&EmailTransport>,
        kind: RouteEventKind,
        html: &str,
        recipients: &[String],
    ) -> Result<EmailOutcome, EmailError> {
        tracing::debug!(
            notifications_enabled = settings.email_notifications,
            transport_name = %settings.default_transport,
            "Resolving email transport"
        );

        let Some(record) = transport else {
            tracing::info!(
                transport_name = %settings.default_transport,
                "No email transport record stored, skipping email leg"
            );
            return Ok(EmailOutcome::NoTransport);
        };

        let Some(mailer) = Mailer::resolve(record)? else {
            tracing::warn!(
                transport_name = %record.name,
                "Unknown email transport family, skipping email leg"
            );
            return Ok(EmailOutcome::UnknownTransport);
        };

        if recipients.is_empty() {
            tracing::info!("No administrator recipients, skipping email leg");
            return Ok(EmailOutcome::NoRecipients);
        }

        let from = sender_mailbox(
            &settings.email_default_sender_name,
            &settings.email_default_sender,
        )?;
        let subject = compose::email_subject(kind);
        mailer.send(from, recipients, subject, html).await?;

        tracing::info!(
            subject,
            recipients = recipients.len(),
            "Route alert email sent"
        );
        Ok(EmailOutcome::Sent)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn transport_record(name: &str, settings: serde_json::Value) -> EmailTransport {
        EmailTransport {
            id: 1,
            name: name.to_string(),
            description: None,
            settings,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn sender_settings(transport: &str) -> SettingsData {
        SettingsData {
            default_transport: transport.to_string(),
            email_default_sender_name: "Kongwatch".to_string(),
            email_default_sender: "alerts@example.com".to_string(),
            ..SettingsData::default()
        }
    }

    #[tokio::test]
    async fn missing_transport_record_short_circuits() {
        let outcome = EmailDelivery::send(
            &sender_settings("mailgun"),
            None,
            RouteEventKind::Created,
            "<p>hi</p>",
            &["a@x.com".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(outcome, EmailOutcome::NoTransport);
    }

    #[tokio::test]
    async fn unknown_transport_family_is_skipped() {
        let record = transport_record("postmark", serde_json::json!({}));
        let outcome = EmailDelivery::send(
            &sender_settings("postmark"),
            Some(&record),
            RouteEventKind::Created,
            "<p>hi</p>",
            &["a@x.com".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(outcome, EmailOutcome::UnknownTransport);
    }

    #[tokio::test]
    async fn empty_recipient_list_skips_before_sending() {
        let record = transport_record("sendmail", serde_json::json!({}));
        let outcome = EmailDelivery::send(
            &sender_settings("sendmail"),
            Some(&record),
            RouteEventKind::Deleted,
            "<p>hi</p>",
            &[],
        )
        .await
        .unwrap();
        assert_eq!(outcome, EmailOutcome::NoRecipients);
    }

    #[tokio::test]
    async fn smtp_record_with_valid_settings_resolves() {
        // Construction must succeed without any network traffic; the empty
        // recipient gate then stops the send.
        let record = transport_record(
            "smtp",
            serde_json::json!({
                "host": "smtp.example.com",
                "port": 2525,
                "secure": false,
                "auth": { "user": "mailer", "pass": "hunter2" }
            }),
        );
        let outcome = EmailDelivery::send(
            &sender_settings("smtp"),
            Some(&record),
            RouteEventKind::Updated,
            "<p>hi</p>",
            &[],
        )
        .await
        .unwrap();
        assert_eq!(outcome, EmailOutcome::NoRecipients);
    }

    #[tokio::test]
    async fn invalid_smtp_settings_fail_resolution() {
        // No host field; resolution fails before the recipient gate, like
        // the transport construction step it models.
        let record = transport_record("smtp", serde_json::json!({ "port": 25 }));
        let result = EmailDelivery::send(
            &sender_settings("smtp"),
            Some(&record),
            RouteEventKind::Created,
            "<p>hi</p>",
            &[],
        )
        .await;
        assert_matches!(result, Err(EmailError::Settings { family: "smtp", .. }));
    }

    #[test]
    fn smtp_settings_parse_minimal_shape() {
        let settings: SmtpSettings =
            serde_json::from_value(serde_json::json!({ "host": "smtp.example.com" })).unwrap();
        assert_eq!(settings.host, "smtp.example.com");
        assert_eq!(settings.port, None);
        assert!(!settings.secure);
        assert!(settings.auth.is_none());
    }

    #[test]
    fn mailgun_settings_parse() {
        let settings: MailgunSettings = serde_json::from_value(serde_json::json!({
            "auth": { "api_key": "key-123", "domain": "mg.example.com" },
            "host": "api.eu.mailgun.net"
        }))
        .unwrap();
        assert_eq!(settings.auth.domain, "mg.example.com");
        assert_eq!(settings.host.as_deref(), Some("api.eu.mailgun.net"));
    }

    #[test]
    fn sender_mailbox_carries_name_and_address() {
        let mailbox = sender_mailbox("Kongwatch", "alerts@example.com").unwrap();
        let rendered = mailbox.to_string();
        assert!(rendered.contains("Kongwatch"));
        assert!(rendered.contains("alerts@example.com"));
    }

    #[test]
    fn sender_mailbox_omits_empty_name() {
        let mailbox = sender_mailbox("", "alerts@example.com").unwrap();
        assert!(mailbox.name.is_none());
    }

    #[test]
    fn sender_mailbox_rejects_bad_address() {
        assert_matches!(
            sender_mailbox("Kongwatch", "not-an-email"),
            Err(EmailError::Address(_))
        );
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn email_error_display_http_status() {
        let err = EmailError::HttpStatus(401);
        assert_eq!(err.to_string(), "Mailgun returned HTTP 401");
    }
}
