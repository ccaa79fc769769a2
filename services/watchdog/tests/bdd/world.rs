//! BDD test world for the watchdog

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cucumber::World;
use tempfile::TempDir;
use watchdog::alert::AlertSettings;
use watchdog::config::{EmailConfig, TelegramConfig};
use watchdog::dispatcher::NotificationDispatcher;
use watchdog::email::EmailChannel;
use watchdog::evaluator::TimeoutEvaluator;
use watchdog::io::{HttpClient, HttpResponse};
use watchdog::mailer::{Email, Mailer};
use watchdog::store::StatusStore;
use watchdog::telegram::TelegramChannel;
use watchdog::{CheckOutcome, Watchdog, WatchdogError};

/// Mailer that records every email and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
    pub fail: Mutex<bool>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> watchdog::Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        if *self.fail.lock().unwrap() {
            Err(WatchdogError::Email("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

/// HTTP client that records Bot API calls and fails for chosen chats
#[derive(Debug, Default)]
pub struct RecordingHttpClient {
    pub chats: Mutex<Vec<String>>,
    pub failing_chats: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl HttpClient for RecordingHttpClient {
    async fn post_form(
        &self,
        _url: &str,
        params: &[(&str, &str)],
    ) -> watchdog::Result<HttpResponse> {
        let chat = params
            .iter()
            .find(|(key, _)| *key == "chat_id")
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();
        self.chats.lock().unwrap().push(chat.clone());

        if self.failing_chats.lock().unwrap().contains(&chat) {
            return Err(WatchdogError::Http("connection reset".to_string()));
        }
        Ok(HttpResponse {
            status: 200,
            body: r#"{"ok":true}"#.to_string(),
        })
    }
}

#[derive(Debug, Default, World)]
pub struct WatchdogWorld {
    pub temp_dir: Option<TempDir>,
    pub document: Option<serde_json::Value>,
    pub written: Option<String>,
    pub timeout_minutes: Option<u64>,
    pub email_credentials: bool,
    pub telegram_token: bool,
    pub mailer: Arc<RecordingMailer>,
    pub http: Arc<RecordingHttpClient>,
    pub outcome: Option<watchdog::Result<CheckOutcome>>,
}

impl WatchdogWorld {
    pub fn status_path(&mut self) -> PathBuf {
        self.temp_dir
            .get_or_insert_with(|| TempDir::new().expect("failed to create temp dir"))
            .path()
            .join("status.json")
    }

    pub fn document_mut(&mut self) -> &mut serde_json::Value {
        self.document.get_or_insert_with(|| serde_json::json!({}))
    }

    pub fn read_document(&mut self) -> serde_json::Value {
        let path = self.status_path();
        let content = std::fs::read_to_string(path).expect("status document missing");
        serde_json::from_str(&content).expect("status document is not JSON")
    }

    pub fn build_watchdog(&mut self) -> Watchdog {
        let email = if self.email_credentials {
            EmailConfig {
                sender: Some("watchdog@example.com".to_string()),
                password: Some("app-password".to_string()),
                admin_email: Some("admin@example.com".to_string()),
                ..Default::default()
            }
        } else {
            EmailConfig::default()
        };
        let telegram = TelegramConfig {
            bot_token: self.telegram_token.then(|| "123:token".to_string()),
            ..Default::default()
        };

        let dispatcher = NotificationDispatcher::new(
            EmailChannel::new(email, self.mailer.clone()),
            TelegramChannel::new(telegram, self.http.clone()),
            AlertSettings::default(),
        );

        Watchdog::new(
            StatusStore::new(self.status_path()),
            TimeoutEvaluator::new(self.timeout_minutes.unwrap_or(10)),
            dispatcher,
        )
    }
}
