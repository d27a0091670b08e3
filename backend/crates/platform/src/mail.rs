//! SMTP mail delivery
//!
//! Thin wrapper over lettre's async tokio transport. Plain-text messages only.

use std::time::Duration;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mailbox address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP connection settings
///
/// With credentials the transport uses STARTTLS; without, it talks plain SMTP
/// (local relays such as MailHog).
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config.from.parse()?;

        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
                    .credentials(Credentials::new(user.clone(), pass.clone()))
                    .port(config.port)
                    .timeout(Some(config.timeout))
                    .build()
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .timeout(Some(config.timeout))
                .build(),
        };

        tracing::info!(host = %config.host, port = config.port, "SMTP mailer initialized");

        Ok(Self { transport, from })
    }

    pub async fn send_text(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let message = build_text_message(&self.from, to, subject, body)?;
        self.transport.send(message).await?;
        tracing::debug!(subject = %subject, "Mail delivered to relay");
        Ok(())
    }
}

fn build_text_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: String,
) -> Result<Message, MailError> {
    let to: Mailbox = to.parse()?;
    let message = Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)?;
    Ok(message)
}
