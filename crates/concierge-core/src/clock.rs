// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp helpers.
//!
//! Timestamps are RFC 3339 UTC strings with millisecond precision, so the
//! string order equals the time order.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// Current time in the persisted format.
pub fn now() -> String {
    format(Utc::now())
}

pub fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// A timestamp strictly after `previous`: `max(now, previous + 1ms)`.
///
/// Used for `updated_at` so every mutation advances it even when two writes
/// land within the same millisecond or the wall clock steps back.
pub fn advance(previous: &str) -> String {
    let now = Utc::now();
    match parse(previous) {
        Some(prev) => format(now.max(prev + Duration::milliseconds(1))),
        None => format(now),
    }
}

/// A timestamp no earlier than `floor`: `max(now, floor)`.
pub fn not_before(floor: Option<&str>) -> String {
    let now = Utc::now();
    match floor.and_then(parse) {
        Some(floor) => format(now.max(floor)),
        None => format(now),
    }
}
