//! Heartbeat timeout evaluation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::document::{LastSeen, Status, StatusDocument};

/// Offset-carrying layouts accepted in addition to RFC 3339
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Zone-less layouts; values in these are read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A parsed `last_seen` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub instant: DateTime<Utc>,
    /// True when the source carried no zone and UTC was assumed
    pub assumed_utc: bool,
}

/// Parse an ISO-8601 timestamp into UTC
pub fn parse_timestamp(raw: &str) -> Result<ParsedTimestamp, String> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(ParsedTimestamp {
            instant: dt.with_timezone(&Utc),
            assumed_utc: false,
        });
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(ParsedTimestamp {
                instant: dt.with_timezone(&Utc),
                assumed_utc: false,
            });
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ParsedTimestamp {
                instant: naive.and_utc(),
                assumed_utc: true,
            });
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(ParsedTimestamp {
            instant: midnight.and_utc(),
            assumed_utc: true,
        });
    }

    Err(format!("'{}' is not an ISO-8601 timestamp", raw))
}

/// Minutes elapsed between two instants, negative if `last_seen` is in the future
pub fn elapsed_minutes(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = now - last_seen;
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 60_000_000.0,
        None => elapsed.num_milliseconds() as f64 / 60_000.0,
    }
}

/// Result of evaluating a document against the timeout
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// No `last_seen` has ever been written
    MissingLastSeen,
    /// `last_seen` could not be interpreted
    UnparsableLastSeen { raw: String, reason: String },
    /// Already offline; no re-alert and no duration update
    AlreadyOffline { elapsed_minutes: f64 },
    /// Status is neither online nor offline
    UnrecognisedStatus { status: String, elapsed_minutes: f64 },
    /// Online and still inside the allowed window
    WithinTimeout { elapsed_minutes: f64 },
    /// Online but silent for longer than the timeout
    TimedOut {
        last_seen: DateTime<Utc>,
        elapsed_minutes: f64,
    },
}

/// Decides whether the document warrants an online to offline transition
#[derive(Debug, Clone)]
pub struct TimeoutEvaluator {
    timeout_minutes: u64,
    reject_naive_timestamps: bool,
}

impl TimeoutEvaluator {
    pub fn new(timeout_minutes: u64) -> Self {
        Self {
            timeout_minutes,
            reject_naive_timestamps: false,
        }
    }

    /// Treat zone-less `last_seen` values as unparsable instead of UTC
    pub fn reject_naive_timestamps(mut self, reject: bool) -> Self {
        self.reject_naive_timestamps = reject;
        self
    }

    pub fn timeout_minutes(&self) -> u64 {
        self.timeout_minutes
    }

    pub fn evaluate(&self, doc: &StatusDocument, now: DateTime<Utc>) -> Evaluation {
        let raw = match doc.last_seen() {
            LastSeen::Missing => return Evaluation::MissingLastSeen,
            LastSeen::Text(raw) => raw,
            LastSeen::Invalid(value) => {
                return Evaluation::UnparsableLastSeen {
                    raw: value.to_string(),
                    reason: "expected a timestamp string".to_string(),
                }
            }
        };

        let parsed = match parse_timestamp(raw) {
            Ok(parsed) => parsed,
            Err(reason) => {
                return Evaluation::UnparsableLastSeen {
                    raw: raw.to_string(),
                    reason,
                }
            }
        };

        if parsed.assumed_utc {
            if self.reject_naive_timestamps {
                return Evaluation::UnparsableLastSeen {
                    raw: raw.to_string(),
                    reason: "timestamp has no timezone information".to_string(),
                };
            }
            tracing::warn!(
                "last_seen '{}' has no timezone information, assuming UTC",
                raw
            );
        }

        let elapsed_minutes = elapsed_minutes(parsed.instant, now);
        tracing::info!("Last seen: {}", parsed.instant.to_rfc3339());
        tracing::info!("Now:       {}", now.to_rfc3339());
        tracing::info!("Difference: {:.2} minutes", elapsed_minutes);

        match doc.status() {
            Status::Online if elapsed_minutes > self.timeout_minutes as f64 => {
                Evaluation::TimedOut {
                    last_seen: parsed.instant,
                    elapsed_minutes,
                }
            }
            Status::Online => Evaluation::WithinTimeout { elapsed_minutes },
            Status::Offline => Evaluation::AlreadyOffline { elapsed_minutes },
            Status::Other(status) => Evaluation::UnrecognisedStatus {
                status,
                elapsed_minutes,
            },
        }
    }
}
