//! BDD step definitions for the notification feature

use cucumber::{given, then};
use serde_json::{json, Value};

use crate::world::WatchdogWorld;

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[given("email credentials are configured")]
fn email_credentials(world: &mut WatchdogWorld) {
    world.email_credentials = true;
}

#[given("email credentials are not configured")]
fn no_email_credentials(world: &mut WatchdogWorld) {
    world.email_credentials = false;
}

#[given("a Telegram bot token is configured")]
fn telegram_token(world: &mut WatchdogWorld) {
    world.telegram_token = true;
}

#[given(expr = "the document lists alert emails {string}")]
fn alert_emails(world: &mut WatchdogWorld, emails: String) {
    world.document_mut()["config"]["alert_emails"] = json!(split_list(&emails));
}

#[given(expr = "Telegram is enabled in the document for chats {string}")]
fn telegram_enabled(world: &mut WatchdogWorld, chats: String) {
    let chat_ids: Vec<Value> = split_list(&chats)
        .into_iter()
        .map(|chat| match chat.parse::<i64>() {
            Ok(id) => Value::from(id),
            Err(_) => Value::from(chat),
        })
        .collect();
    world.document_mut()["config"]["telegram"] = json!({ "enabled": true, "chat_ids": chat_ids });
}

#[given(expr = "Telegram is disabled in the document for chats {string}")]
fn telegram_disabled(world: &mut WatchdogWorld, chats: String) {
    world.document_mut()["config"]["telegram"] =
        json!({ "enabled": false, "chat_ids": split_list(&chats) });
}

#[given("the document's notification settings are loosely typed")]
fn loosely_typed_config(world: &mut WatchdogWorld) {
    world.document_mut()["config"] = json!({
        "alert_emails": "ops@example.com",
        "telegram": { "enabled": "true", "chat_ids": [111.0, { "id": 2 }] }
    });
}

#[given("the email transport is down")]
fn email_down(world: &mut WatchdogWorld) {
    *world.mailer.fail.lock().unwrap() = true;
}

#[given(expr = "Telegram delivery to chat {string} fails")]
fn telegram_chat_fails(world: &mut WatchdogWorld, chat: String) {
    world.http.failing_chats.lock().unwrap().push(chat);
}

#[then(expr = "an email should be attempted to {string}")]
fn email_attempted(world: &mut WatchdogWorld, recipients: String) {
    let sent = world.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "expected exactly one email, got {:?}", sent);
    assert_eq!(sent[0].to, split_list(&recipients));
}

#[then("no email should be attempted")]
fn no_email(world: &mut WatchdogWorld) {
    assert!(world.mailer.sent.lock().unwrap().is_empty());
}

#[then(expr = "Telegram messages should be attempted for chats {string}")]
fn telegram_attempted(world: &mut WatchdogWorld, chats: String) {
    assert_eq!(*world.http.chats.lock().unwrap(), split_list(&chats));
}

#[then("no Telegram message should be attempted")]
fn no_telegram(world: &mut WatchdogWorld) {
    assert!(world.http.chats.lock().unwrap().is_empty());
}

#[then(expr = "{int} Telegram deliveries should have failed")]
fn telegram_failures(world: &mut WatchdogWorld, count: usize) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    match outcome {
        Ok(watchdog::CheckOutcome::MarkedOffline { report, .. }) => {
            assert_eq!(report.telegram.failed(), count)
        }
        other => panic!("expected a transition, got {:?}", other),
    }
}

#[then("the email delivery should be recorded as failed")]
fn email_failed(world: &mut WatchdogWorld) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    match outcome {
        Ok(watchdog::CheckOutcome::MarkedOffline { report, .. }) => {
            assert_eq!(report.email.failed(), 1)
        }
        other => panic!("expected a transition, got {:?}", other),
    }
}
