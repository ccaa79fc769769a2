//! Delivery bookkeeping shared by the notification channels

use std::fmt;

use serde::{Deserialize, Serialize};

/// Notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Telegram,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Telegram => write!(f, "telegram"),
        }
    }
}

/// Record of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub channel: Channel,
    pub target: String,
    pub success: bool,
    pub error: Option<String>,
}

impl DeliveryRecord {
    pub fn from_result(
        channel: Channel,
        target: impl Into<String>,
        result: &crate::Result<()>,
    ) -> Self {
        Self {
            channel,
            target: target.into(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// Whether a channel attempted delivery at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Attempted,
    Skipped(String),
}

/// Outcome of one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub status: ChannelStatus,
    pub deliveries: Vec<DeliveryRecord>,
}

impl ChannelReport {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: ChannelStatus::Skipped(reason.into()),
            deliveries: Vec::new(),
        }
    }

    pub fn attempted(deliveries: Vec<DeliveryRecord>) -> Self {
        Self {
            status: ChannelStatus::Attempted,
            deliveries,
        }
    }

    pub fn is_attempted(&self) -> bool {
        self.status == ChannelStatus::Attempted
    }

    pub fn succeeded(&self) -> usize {
        self.deliveries.iter().filter(|d| d.success).count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.iter().filter(|d| !d.success).count()
    }
}

/// Outcome of dispatching one alert over both channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub email: ChannelReport,
    pub telegram: ChannelReport,
}

impl DispatchReport {
    pub fn deliveries(&self) -> impl Iterator<Item = &DeliveryRecord> {
        self.email.deliveries.iter().chain(&self.telegram.deliveries)
    }

    pub fn log_summary(&self) {
        let channels = [(Channel::Email, &self.email), (Channel::Telegram, &self.telegram)];
        for (channel, report) in channels {
            match &report.status {
                ChannelStatus::Attempted => tracing::info!(
                    "{}: {} delivered, {} failed",
                    channel,
                    report.succeeded(),
                    report.failed()
                ),
                ChannelStatus::Skipped(reason) => {
                    tracing::info!("{}: skipped ({})", channel, reason)
                }
            }
        }
    }
}
