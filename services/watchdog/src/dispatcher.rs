//! Alert fan-out over the email and Telegram channels

use chrono::{DateTime, Utc};

use crate::alert::{AlertMessage, AlertSettings};
use crate::document::StatusDocument;
use crate::email::EmailChannel;
use crate::notifier::DispatchReport;
use crate::telegram::TelegramChannel;

/// Formats the alert and hands it to both channels.
///
/// Channels are independent: each catches its own failures, so one being
/// down never prevents the other from being attempted.
#[derive(Debug)]
pub struct NotificationDispatcher {
    email: EmailChannel,
    telegram: TelegramChannel,
    alert: AlertSettings,
}

impl NotificationDispatcher {
    pub fn new(email: EmailChannel, telegram: TelegramChannel, alert: AlertSettings) -> Self {
        Self {
            email,
            telegram,
            alert,
        }
    }

    /// Alert about a timeout of `elapsed_minutes` since `last_seen`
    pub async fn dispatch(
        &self,
        doc: &StatusDocument,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
        elapsed_minutes: f64,
    ) -> DispatchReport {
        let message = AlertMessage::compose(
            &self.alert,
            doc.last_seen().as_text().unwrap_or_default(),
            last_seen,
            now,
            elapsed_minutes,
        );

        let email = self
            .email
            .send_alert(&doc.alert_emails(), &message.subject, &message.email_body)
            .await;

        let telegram = self
            .telegram
            .broadcast(doc.telegram_enabled(), &doc.chat_ids(), &message.chat_text)
            .await;

        DispatchReport { email, telegram }
    }
}
