//! Watchdog CLI
//!
//! Runs one heartbeat check. Meant to be invoked periodically by a scheduler
//! (cron, systemd timer, CI schedule); runs must not overlap.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use watchdog::alert::{AlertSettings, DEFAULT_DISPLAY_OFFSET_HOURS};
use watchdog::config::{
    EmailConfig, TelegramConfig, DEFAULT_SENDER_NAME, DEFAULT_SITE_NAME, DEFAULT_SMTP_HOST,
    DEFAULT_STATUS_FILE, DEFAULT_TIMEOUT_MINUTES, TELEGRAM_API_URL,
};
use watchdog::Config;

#[derive(Parser)]
#[command(name = "watchdog")]
#[command(about = "Heartbeat watchdog: marks a silent endpoint offline and sends alerts")]
#[command(version)]
struct Args {
    /// Path to the status document
    #[arg(long, env = "STATUS_FILE", default_value = DEFAULT_STATUS_FILE)]
    status_file: PathBuf,

    /// Minutes without a heartbeat before the endpoint is declared offline
    #[arg(long, env = "TIMEOUT_MINUTES", default_value_t = DEFAULT_TIMEOUT_MINUTES)]
    timeout_minutes: u64,

    /// Treat last_seen values without a timezone as unparsable instead of UTC
    #[arg(long, env = "REJECT_NAIVE_TIMESTAMPS")]
    reject_naive_timestamps: bool,

    /// SMTP login and sender address
    #[arg(long, env = "SMTP_USER")]
    smtp_user: Option<String>,

    /// SMTP app password
    #[arg(long, env = "SMTP_APP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// Recipient when the status document lists no alert emails
    #[arg(long, env = "ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// SMTP relay (implicit TLS on port 465)
    #[arg(long, env = "SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    smtp_host: String,

    /// Display name on outgoing email
    #[arg(long, env = "SENDER_NAME", default_value = DEFAULT_SENDER_NAME)]
    sender_name: String,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_bot_token: Option<String>,

    /// Site name used in alert text
    #[arg(long, env = "SITE_NAME", default_value = DEFAULT_SITE_NAME)]
    site_name: String,

    /// UTC offset, in hours, for times shown in alert text
    #[arg(
        long,
        env = "DISPLAY_UTC_OFFSET_HOURS",
        default_value_t = DEFAULT_DISPLAY_OFFSET_HOURS,
        allow_hyphen_values = true
    )]
    display_utc_offset_hours: i32,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

impl Args {
    fn into_config(self) -> watchdog::Result<Config> {
        Ok(Config {
            status_file: self.status_file,
            timeout_minutes: self.timeout_minutes,
            reject_naive_timestamps: self.reject_naive_timestamps,
            email: EmailConfig {
                smtp_host: self.smtp_host,
                sender: self.smtp_user,
                password: self.smtp_password,
                admin_email: self.admin_email,
                sender_name: self.sender_name,
            },
            telegram: TelegramConfig {
                bot_token: self.telegram_bot_token,
                api_url: TELEGRAM_API_URL.to_string(),
            },
            alert: AlertSettings::new(self.site_name, self.display_utc_offset_hours)?,
        })
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: status_file={:?}, timeout_minutes={}, log_level={:?}",
        args.status_file,
        args.timeout_minutes,
        args.log_level
    );

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(watchdog::run(config)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
