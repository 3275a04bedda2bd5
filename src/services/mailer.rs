// src/services/mailer.rs

//! Outbound mail dispatch.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::error::{AppError, Result};

/// Fixed provider relay.
const SMTP_HOST: &str = "smtp.mail.yahoo.com";
const SMTP_PORT: u16 = 465;

/// Display name on the from address.
const FROM_NAME: &str = "FMI News";

/// Dispatches a rendered notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one notification with an HTML body to every configured recipient.
    async fn send(&self, subject: &str, html_body: &str) -> Result<()>;
}

/// SMTP notifier over the provider relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl SmtpMailer {
    /// Build the transport and envelope from configuration.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)
            .map_err(AppError::send)?
            .port(SMTP_PORT)
            .credentials(credentials)
            .build();

        let from = Mailbox::new(Some(FROM_NAME.to_string()), config.username.parse()?);
        let recipients = config
            .recipients
            .iter()
            .map(|address| Ok(Mailbox::new(None, address.parse()?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            transport,
            from,
            recipients,
        })
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn send(&self, subject: &str, html_body: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        let message = builder
            .body(html_body.to_string())
            .map_err(AppError::send)?;
        self.transport.send(message).await.map_err(AppError::send)?;

        log::info!("Notification '{}' sent to {} recipient(s).", subject, self.recipients.len());
        Ok(())
    }
}
