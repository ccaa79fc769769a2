//! Incident recording on an online to offline transition

use chrono::{DateTime, SecondsFormat, Utc};

use crate::document::{IncidentRecord, Status, StatusDocument};

/// Incident type written when a heartbeat timeout is detected
pub const OFFLINE_DETECTED: &str = "offline_detected";

/// Format an instant the way timestamps are stored in the document
/// (RFC 3339, microsecond precision, `Z` suffix)
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Mark the document offline and prepend a fresh incident to its history.
///
/// The incident duration starts at zero and is not revisited by later runs.
pub fn record_transition(doc: &mut StatusDocument, now: DateTime<Utc>) -> IncidentRecord {
    doc.set_status(Status::Offline);

    let incident = IncidentRecord {
        timestamp: format_timestamp(now),
        kind: OFFLINE_DETECTED.to_string(),
        duration_minutes: 0,
    };
    doc.prepend_history(incident.to_value());

    incident
}
