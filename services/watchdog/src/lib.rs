//! Watchdog - heartbeat timeout detection and alerting
//!
//! Reads a status document written by an external reporter, marks the
//! endpoint offline when its heartbeat is overdue, records an incident and
//! alerts over email and Telegram. One check per invocation.

pub mod alert;
pub mod config;
pub mod dispatcher;
pub mod document;
pub mod email;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod mailer;
pub mod notifier;
pub mod recorder;
pub mod store;
pub mod telegram;
pub mod watchdog;

pub use config::Config;
pub use error::{Result, WatchdogError};
pub use watchdog::{CheckOutcome, Watchdog};

use std::sync::Arc;

use crate::dispatcher::NotificationDispatcher;
use crate::email::EmailChannel;
use crate::evaluator::TimeoutEvaluator;
use crate::io::ReqwestHttpClient;
use crate::mailer::SmtpMailer;
use crate::store::StatusStore;
use crate::telegram::TelegramChannel;

/// Build a watchdog wired to the real SMTP and HTTP transports
pub fn build(config: Config) -> Watchdog {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::default());
    let mailer: Arc<dyn mailer::Mailer> = Arc::new(SmtpMailer::new(config.email.clone()));

    let dispatcher = NotificationDispatcher::new(
        EmailChannel::new(config.email, mailer),
        TelegramChannel::new(config.telegram, http),
        config.alert,
    );

    let evaluator = TimeoutEvaluator::new(config.timeout_minutes)
        .reject_naive_timestamps(config.reject_naive_timestamps);

    Watchdog::new(StatusStore::new(config.status_file), evaluator, dispatcher)
}

/// Run a single check against the current time
pub async fn run(config: Config) -> Result<CheckOutcome> {
    tracing::debug!("Running check with {:?}", config);
    build(config).check(chrono::Utc::now()).await
}
