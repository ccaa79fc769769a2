//! Watchdog: one check of the status document

use chrono::{DateTime, Utc};

use crate::dispatcher::NotificationDispatcher;
use crate::document::IncidentRecord;
use crate::evaluator::{Evaluation, TimeoutEvaluator};
use crate::notifier::DispatchReport;
use crate::recorder::record_transition;
use crate::store::StatusStore;

/// What a single check did
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Nothing changed; the evaluation says why
    NoAction(Evaluation),
    /// The document was flipped offline and saved, then alerts were sent
    MarkedOffline {
        incident: IncidentRecord,
        elapsed_minutes: f64,
        report: DispatchReport,
    },
}

impl CheckOutcome {
    pub fn is_transition(&self) -> bool {
        matches!(self, CheckOutcome::MarkedOffline { .. })
    }
}

/// Load, evaluate, record, save, dispatch
#[derive(Debug)]
pub struct Watchdog {
    store: StatusStore,
    evaluator: TimeoutEvaluator,
    dispatcher: NotificationDispatcher,
}

impl Watchdog {
    pub fn new(
        store: StatusStore,
        evaluator: TimeoutEvaluator,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            evaluator,
            dispatcher,
        }
    }

    /// Run one check as of `now`.
    ///
    /// Fails only when the document cannot be loaded or saved. Bad
    /// timestamps and delivery failures are reported through the outcome.
    pub async fn check(&self, now: DateTime<Utc>) -> crate::Result<CheckOutcome> {
        let mut doc = self.store.load()?;

        let (last_seen, elapsed_minutes) = match self.evaluator.evaluate(&doc, now) {
            Evaluation::TimedOut {
                last_seen,
                elapsed_minutes,
            } => (last_seen, elapsed_minutes),
            evaluation => {
                log_no_action(&evaluation);
                return Ok(CheckOutcome::NoAction(evaluation));
            }
        };

        tracing::warn!(
            "TIMEOUT EXCEEDED ({}m). Setting status to OFFLINE.",
            self.evaluator.timeout_minutes()
        );

        let incident = record_transition(&mut doc, now);
        // Persist before alerting so the offline fact survives a delivery failure
        self.store.save(&doc)?;

        let report = self
            .dispatcher
            .dispatch(&doc, last_seen, now, elapsed_minutes)
            .await;
        report.log_summary();

        Ok(CheckOutcome::MarkedOffline {
            incident,
            elapsed_minutes,
            report,
        })
    }
}

fn log_no_action(evaluation: &Evaluation) {
    match evaluation {
        Evaluation::MissingLastSeen => tracing::info!("No last_seen timestamp found."),
        Evaluation::UnparsableLastSeen { raw, reason } => {
            tracing::error!("Error parsing date {}: {}", raw, reason)
        }
        Evaluation::AlreadyOffline { .. } => {
            tracing::info!("System is already offline. No new alert.")
        }
        Evaluation::UnrecognisedStatus { status, .. } => {
            tracing::info!("Status is '{}', not online. No action.", status)
        }
        Evaluation::WithinTimeout { .. } => {
            tracing::info!("System is online and within timeout limits.")
        }
        Evaluation::TimedOut { .. } => {}
    }
}
