//! UTC instants for execution records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC instant, serialized as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Milliseconds from `earlier` to `self`; negative when `earlier` is later.
    pub fn millis_since(&self, earlier: &Timestamp) -> i64 {
        self.0.signed_duration_since(earlier.0).num_milliseconds()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, millis: u32) -> Timestamp {
        Timestamp::from(Utc.timestamp_opt(secs, millis * 1_000_000).unwrap())
    }

    #[test]
    fn now_is_monotonic_enough() {
        let first = Timestamp::now();
        let second = Timestamp::now();
        assert!(second >= first);
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let json = serde_json::to_value(at(1_705_314_600, 0)).unwrap();
        assert_eq!(json, serde_json::json!("2024-01-15T10:30:00Z"));
    }

    #[test]
    fn display_keeps_milliseconds() {
        assert_eq!(at(1_705_314_600, 250).to_string(), "2024-01-15T10:30:00.250Z");
    }

    #[test]
    fn millis_since_is_signed() {
        let start = at(1_000, 0);
        let end = at(1_002, 500);
        assert_eq!(end.millis_since(&start), 2_500);
        assert_eq!(start.millis_since(&end), -2_500);
    }
}
