//! Mail transport abstraction and the SMTP implementation

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::WatchdogError;

/// A plain-text email addressed to one or more recipients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from_name: String,
    pub from_address: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Abstraction over mail delivery for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> crate::Result<()>;
}

/// SMTP delivery over implicit TLS (port 465)
pub struct SmtpMailer {
    config: EmailConfig,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("smtp_host", &self.config.smtp_host)
            .finish()
    }
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> crate::Result<()> {
        let (user, password) = self.config.credentials().ok_or_else(|| {
            WatchdogError::Config("SMTP credentials are not configured".to_string())
        })?;

        let message = build_message(email)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| {
                WatchdogError::Email(format!(
                    "Invalid SMTP relay '{}': {}",
                    self.config.smtp_host, e
                ))
            })?
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build();

        tracing::debug!(
            "Sending email via {} to {} recipient(s)",
            self.config.smtp_host,
            email.to.len()
        );

        transport
            .send(message)
            .await
            .map_err(|e| WatchdogError::Email(format!("SMTP send failed: {}", e)))?;

        Ok(())
    }
}

/// Build the MIME message. Recipients that are not valid addresses are
/// dropped with a warning; at least one must remain.
pub fn build_message(email: &Email) -> crate::Result<Message> {
    let from_address: Address = email.from_address.parse().map_err(|e| {
        WatchdogError::Email(format!(
            "Invalid sender address '{}': {}",
            email.from_address, e
        ))
    })?;
    let from = Mailbox::new(Some(email.from_name.clone()), from_address);

    let mut builder = Message::builder()
        .from(from)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN);

    let mut recipients = 0;
    for to in &email.to {
        match to.parse::<Mailbox>() {
            Ok(mailbox) => {
                builder = builder.to(mailbox);
                recipients += 1;
            }
            Err(e) => tracing::warn!("Skipping invalid recipient '{}': {}", to, e),
        }
    }

    if recipients == 0 {
        return Err(WatchdogError::Email("No valid recipients".to_string()));
    }

    builder
        .body(email.body.clone())
        .map_err(|e| WatchdogError::Email(format!("Building message: {}", e)))
}
