//! BDD step definitions for the timeout check feature

use chrono::{DateTime, Utc};
use cucumber::{given, then, when};
use serde_json::{json, Value};
use watchdog::evaluator::Evaluation;
use watchdog::{CheckOutcome, WatchdogError};

use crate::world::WatchdogWorld;

#[given(expr = "a status document with last_seen {string} and status {string}")]
fn document_with_last_seen(world: &mut WatchdogWorld, last_seen: String, status: String) {
    world.document = Some(json!({ "last_seen": last_seen, "status": status }));
}

#[given(expr = "a status document without last_seen and status {string}")]
fn document_without_last_seen(world: &mut WatchdogWorld, status: String) {
    world.document = Some(json!({ "status": status }));
}

#[given("no status document exists")]
fn no_document(world: &mut WatchdogWorld) {
    world.document = None;
}

#[given(expr = "the document has an earlier incident at {string}")]
fn earlier_incident(world: &mut WatchdogWorld, timestamp: String) {
    world.document_mut()["history"] = json!([
        { "timestamp": timestamp, "type": "offline_detected", "duration_minutes": 7 }
    ]);
}

#[given(expr = "the document carries the extra field {string} set to {string}")]
fn extra_field(world: &mut WatchdogWorld, key: String, value: String) {
    world.document_mut()[key.as_str()] = Value::from(value);
}

#[given(expr = "a timeout of {int} minutes")]
fn timeout(world: &mut WatchdogWorld, minutes: u64) {
    world.timeout_minutes = Some(minutes);
}

#[when(expr = "the watchdog checks at {string}")]
async fn check_at(world: &mut WatchdogWorld, now: String) {
    let now: DateTime<Utc> = DateTime::parse_from_rfc3339(&now)
        .expect("invalid check time")
        .with_timezone(&Utc);

    let path = world.status_path();
    if let Some(document) = &world.document {
        let content = serde_json::to_string_pretty(document).unwrap();
        std::fs::write(&path, &content).unwrap();
        world.written = Some(content);
    }

    let watchdog = world.build_watchdog();
    world.outcome = Some(watchdog.check(now).await);
}

#[then("the check should succeed")]
fn check_succeeds(world: &mut WatchdogWorld) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    assert!(outcome.is_ok(), "check failed: {:?}", outcome);
}

#[then("the check should fail because the document is missing")]
fn check_fails_not_found(world: &mut WatchdogWorld) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    assert!(
        matches!(outcome, Err(WatchdogError::NotFound(_))),
        "unexpected outcome: {:?}",
        outcome
    );
}

#[then("the endpoint should be marked offline")]
fn marked_offline(world: &mut WatchdogWorld) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    assert!(
        matches!(outcome, Ok(CheckOutcome::MarkedOffline { .. })),
        "unexpected outcome: {:?}",
        outcome
    );
}

#[then("no action should be taken")]
fn no_action(world: &mut WatchdogWorld) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    assert!(
        matches!(outcome, Ok(CheckOutcome::NoAction(_))),
        "unexpected outcome: {:?}",
        outcome
    );
}

#[then("a timestamp diagnostic should be reported")]
fn timestamp_diagnostic(world: &mut WatchdogWorld) {
    let outcome = world.outcome.as_ref().expect("no check was run");
    assert!(
        matches!(
            outcome,
            Ok(CheckOutcome::NoAction(Evaluation::UnparsableLastSeen { .. }))
        ),
        "unexpected outcome: {:?}",
        outcome
    );
}

#[then(expr = "the stored status should be {string}")]
fn stored_status(world: &mut WatchdogWorld, status: String) {
    assert_eq!(world.read_document()["status"], Value::from(status));
}

#[then(expr = "the history should contain {int} incident(s)")]
fn history_length(world: &mut WatchdogWorld, count: usize) {
    let document = world.read_document();
    let history = document["history"].as_array().cloned().unwrap_or_default();
    assert_eq!(history.len(), count);
}

#[then(expr = "the newest incident should be {string} with duration {int}")]
fn newest_incident(world: &mut WatchdogWorld, kind: String, duration: u64) {
    let document = world.read_document();
    let newest = &document["history"][0];
    assert_eq!(newest["type"], Value::from(kind));
    assert_eq!(newest["duration_minutes"], Value::from(duration));
}

#[then(expr = "the newest incident should be timestamped {string}")]
fn newest_incident_timestamp(world: &mut WatchdogWorld, timestamp: String) {
    let document = world.read_document();
    assert_eq!(document["history"][0]["timestamp"], Value::from(timestamp));
}

#[then(expr = "the oldest incident should be timestamped {string}")]
fn oldest_incident_timestamp(world: &mut WatchdogWorld, timestamp: String) {
    let document = world.read_document();
    let history = document["history"].as_array().cloned().unwrap_or_default();
    let oldest = history.last().expect("history is empty");
    assert_eq!(oldest["timestamp"], Value::from(timestamp));
}

#[then(expr = "the stored field {string} should be {string}")]
fn stored_field(world: &mut WatchdogWorld, key: String, value: String) {
    assert_eq!(world.read_document()[key.as_str()], Value::from(value));
}

#[then("the status document should be unchanged")]
fn document_unchanged(world: &mut WatchdogWorld) {
    let path = world.status_path();
    let written = world.written.as_deref().expect("no document was written");
    assert_eq!(std::fs::read_to_string(path).unwrap(), written);
}
