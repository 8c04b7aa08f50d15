//! Notifier: wraps the summary in the briefing template and mails it.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::error::{BriefingError, BriefingResult};
use crate::summarizer::Summary;

/// Default Gmail SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default Gmail SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Subject line prefix; the run date follows.
pub const SUBJECT_PREFIX: &str = "Renewable Energy News";

/// Mail relay and addressing.
#[derive(Clone)]
pub struct MailSettings {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Sender address, also the SMTP login.
    pub sender: String,
    /// SMTP password (Gmail app password).
    pub password: String,
    /// The one recipient.
    pub recipient: String,
    /// Name used in the greeting, if any.
    pub recipient_name: Option<String>,
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("recipient_name", &self.recipient_name)
            .finish()
    }
}

/// The one email sent per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl BriefingEmail {
    /// Compose the briefing for a run date.
    #[must_use]
    pub fn compose(settings: &MailSettings, summary: &Summary, run_date: NaiveDate) -> Self {
        Self {
            from: settings.sender.clone(),
            to: settings.recipient.clone(),
            subject: subject_for(run_date),
            body: render_body(settings.recipient_name.as_deref(), summary.as_str()),
        }
    }

    /// Build a multipart message with a single plain-text part.
    pub fn to_message(&self) -> BriefingResult<Message> {
        let from: Mailbox = self
            .from
            .parse()
            .map_err(|e| BriefingError::Mail(format!("Invalid from email address: {e}")))?;

        let to: Mailbox = self
            .to
            .parse()
            .map_err(|e| BriefingError::Mail(format!("Invalid to email address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .multipart(
                MultiPart::mixed().singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(self.body.clone()),
                ),
            )
            .map_err(|e| BriefingError::Mail(format!("Failed to build email message: {e}")))
    }
}

/// `"Renewable Energy News - YYYY-MM-DD"`
#[must_use]
pub fn subject_for(run_date: NaiveDate) -> String {
    format!("{SUBJECT_PREFIX} - {}", run_date.format("%Y-%m-%d"))
}

/// Greeting and closing around the summary, which goes in untouched.
#[must_use]
pub fn render_body(recipient_name: Option<&str>, summary: &str) -> String {
    let greeting = match recipient_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("Good morning {name},"),
        None => "Good morning,".to_string(),
    };

    format!(
        "{greeting}\n\nHere's your daily renewable energy briefing:\n\n{summary}\n\nBest regards,\nYour News Agent\n"
    )
}

/// Delivers a composed briefing.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Get the name of this transport.
    fn name(&self) -> &'static str;

    /// Send exactly one message.
    async fn send(&self, email: &BriefingEmail) -> BriefingResult<()>;
}

/// SMTP transport over STARTTLS.
///
/// The transport is built per send without a pool, so the session is closed
/// once the message is handed over or the attempt fails.
pub struct SmtpMailer {
    settings: MailSettings,
}

impl SmtpMailer {
    /// Create a new SMTP mailer with the given settings.
    #[must_use]
    pub const fn new(settings: MailSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: &BriefingEmail) -> BriefingResult<()> {
        let message = email.to_message()?;

        let creds = Credentials::new(self.settings.sender.clone(), self.settings.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.smtp_host)
                .map_err(|e| BriefingError::Mail(format!("Failed to create SMTP transport: {e}")))?
                .port(self.settings.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(message)
            .await
            .map_err(|e| BriefingError::Mail(format!("Failed to send email via SMTP: {e}")))?;

        info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(())
    }
}
