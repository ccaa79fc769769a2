//! Human-readable alert text

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Fixed display offset used by default (UTC-3)
pub const DEFAULT_DISPLAY_OFFSET_HOURS: i32 = -3;

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Presentation settings for alert text
#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub site_name: String,
    pub display_offset: FixedOffset,
}

impl AlertSettings {
    pub fn new(site_name: impl Into<String>, offset_hours: i32) -> crate::Result<Self> {
        let display_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                crate::WatchdogError::Config(format!(
                    "Display UTC offset out of range: {} hours",
                    offset_hours
                ))
            })?;

        Ok(Self {
            site_name: site_name.into(),
            display_offset,
        })
    }

    /// Label for the display offset, e.g. `UTC-3` or `UTC+5:30`
    pub fn offset_label(&self) -> String {
        let seconds = self.display_offset.local_minus_utc();
        if seconds == 0 {
            return "UTC".to_string();
        }
        let sign = if seconds < 0 { '-' } else { '+' };
        let hours = seconds.abs() / 3600;
        let minutes = (seconds.abs() % 3600) / 60;
        if minutes == 0 {
            format!("UTC{}{}", sign, hours)
        } else {
            format!("UTC{}{}:{:02}", sign, hours, minutes)
        }
    }

    fn display(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{} ({})",
            instant
                .with_timezone(&self.display_offset)
                .format(DISPLAY_FORMAT),
            self.offset_label()
        )
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            site_name: crate::config::DEFAULT_SITE_NAME.to_string(),
            display_offset: FixedOffset::east_opt(DEFAULT_DISPLAY_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// Alert text for both channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub email_body: String,
    /// Markdown for the messaging channel
    pub chat_text: String,
}

impl AlertMessage {
    pub fn compose(
        settings: &AlertSettings,
        last_seen_raw: &str,
        last_seen: DateTime<Utc>,
        now: DateTime<Utc>,
        elapsed_minutes: f64,
    ) -> Self {
        let minutes = elapsed_minutes.trunc() as i64;
        let site = &settings.site_name;

        let subject = format!("🔴 ALERT: {} offline (>{}min)", site, minutes);

        let email_body = format!(
            "The heartbeat watchdog has detected that {} is unreachable.\n\n\
             Last contact: {}\n\
             Elapsed time: {} minutes\n\
             Alert raised: {}\n\n\
             Please check the internet connection or power at the site.",
            site,
            last_seen_raw,
            minutes,
            settings.display(now),
        );

        let chat_text = format!(
            "🚨 *ALERT: System offline*\n\n\
             📍 *Site:* {}\n\
             ⏰ *Last signal:* {}\n\
             ⌛ *Elapsed time:* {} minutes\n\n\
             Please check the site's connectivity.",
            site,
            settings.display(last_seen),
            minutes,
        );

        Self {
            subject,
            email_body,
            chat_text,
        }
    }
}
