//! Configuration types for the watchdog
//!
//! Assembled once from the command line and environment in `main` and passed
//! down explicitly; nothing below this module reads the environment.

use std::fmt;
use std::path::PathBuf;

use crate::alert::AlertSettings;

pub const DEFAULT_STATUS_FILE: &str = "data/status.json";
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 10;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SENDER_NAME: &str = "Heartbeat Watchdog";
pub const DEFAULT_SITE_NAME: &str = "Monitored site";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub status_file: PathBuf,
    pub timeout_minutes: u64,
    pub reject_naive_timestamps: bool,
    pub email: EmailConfig,
    pub telegram: TelegramConfig,
    pub alert: AlertSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            status_file: PathBuf::from(DEFAULT_STATUS_FILE),
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            reject_naive_timestamps: false,
            email: EmailConfig::default(),
            telegram: TelegramConfig::default(),
            alert: AlertSettings::default(),
        }
    }
}

/// SMTP transport settings and credentials
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub sender: Option<String>,
    pub password: Option<String>,
    pub admin_email: Option<String>,
    pub sender_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            sender: None,
            password: None,
            admin_email: None,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("admin_email", &self.admin_email)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

impl EmailConfig {
    /// Sender address and password, if both are present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let sender = non_empty(self.sender.as_deref())?;
        let password = non_empty(self.password.as_deref())?;
        Some((sender, password))
    }

    /// Fallback recipient: the administrator address, else the sender itself
    pub fn admin_address(&self) -> Option<&str> {
        non_empty(self.admin_email.as_deref()).or_else(|| non_empty(self.sender.as_deref()))
    }
}

/// Bot API settings
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub api_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: TELEGRAM_API_URL.to_string(),
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl TelegramConfig {
    pub fn bot_token(&self) -> Option<&str> {
        non_empty(self.bot_token.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
