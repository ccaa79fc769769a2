//! Email alert channel

use std::sync::Arc;

use crate::config::EmailConfig;
use crate::mailer::{Email, Mailer};
use crate::notifier::{Channel, ChannelReport, DeliveryRecord};

/// Sends one alert email to the document's recipients, or the administrator
pub struct EmailChannel {
    config: EmailConfig,
    mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for EmailChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailChannel")
            .field("config", &self.config)
            .finish()
    }
}

impl EmailChannel {
    pub fn new(config: EmailConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self { config, mailer }
    }

    /// Trimmed, de-duplicated `alert_emails`; the admin address when that is empty
    pub fn resolve_recipients(&self, alert_emails: &[String]) -> Vec<String> {
        let mut recipients: Vec<String> = Vec::new();
        for address in alert_emails.iter().map(|a| a.trim()) {
            if !address.is_empty() && !recipients.iter().any(|r| r == address) {
                recipients.push(address.to_string());
            }
        }

        if recipients.is_empty() {
            if let Some(admin) = self.config.admin_address() {
                recipients.push(admin.to_string());
            }
        }
        recipients
    }

    /// Send the alert. Never fails; the outcome is in the returned report.
    pub async fn send_alert(
        &self,
        alert_emails: &[String],
        subject: &str,
        body: &str,
    ) -> ChannelReport {
        let Some((sender, _)) = self.config.credentials() else {
            tracing::warn!("SMTP user or app password not set. Skipping email.");
            return ChannelReport::skipped("SMTP credentials not configured");
        };

        let recipients = self.resolve_recipients(alert_emails);
        let target = recipients.join(", ");

        let email = Email {
            from_name: self.config.sender_name.clone(),
            from_address: sender.to_string(),
            to: recipients,
            subject: subject.to_string(),
            body: body.to_string(),
        };

        let result = self.mailer.send(&email).await;
        match &result {
            Ok(()) => tracing::info!("Email sent successfully to: {}", target),
            Err(e) => tracing::error!("Error sending email to {}: {}", target, e),
        }

        ChannelReport::attempted(vec![DeliveryRecord::from_result(
            Channel::Email,
            target,
            &result,
        )])
    }
}
