//! # Temporal Types
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds
//! precision. Deadlines in the Tenancy Stack (`held_until`, agreement end
//! dates) are plain data compared against a caller-supplied clock; nothing
//! in the core ever reads the wall clock on its own during an operation.
//!
//! Non-UTC inputs are rejected at construction. There is no silent
//! conversion that could make two renderings of the same instant disagree.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated. Host convenience;
///   core operations receive time through [`CallContext`](crate::CallContext).
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating.
/// - [`Timestamp::from_epoch_secs()`] — from Unix epoch seconds.
/// - [`Timestamp::parse()`] — from an RFC 3339 string with `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating
    /// sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimestamp`] if `secs` is outside
    /// the representable range.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        let dt = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ValidationError::InvalidTimestamp(format!("epoch seconds {secs}")))?;
        Ok(Self(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only the `Z` suffix is accepted. Explicit offsets, including
    /// `+00:00`, are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimestamp`] if the string is not
    /// valid RFC 3339 or does not end in `Z`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp(format!(
                "must use Z suffix (UTC only), got {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ValidationError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_epoch_secs_roundtrip() {
        let ts = Timestamp::from_epoch_secs(1625097600).unwrap();
        assert_eq!(ts.epoch_secs(), 1625097600);
        assert_eq!(ts.to_iso8601(), "2021-07-01T00:00:00Z");
    }

    #[test]
    fn parse_accepts_z_suffix() {
        let ts = Timestamp::parse("2026-03-01T12:30:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-01T12:30:00Z");
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-03-01T12:30:00+00:00").is_err());
        assert!(Timestamp::parse("2026-03-01T12:30:00+05:30").is_err());
        assert!(Timestamp::parse("2026-03-01T12:30:00").is_err());
        assert!(Timestamp::parse("garbage").is_err());
    }

    #[test]
    fn parse_truncates_subseconds() {
        let ts = Timestamp::parse("2026-03-01T12:30:00.987Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-01T12:30:00Z");
    }

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::from_epoch_secs(1000).unwrap();
        let later = Timestamp::from_epoch_secs(2000).unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn display_matches_iso8601() {
        let ts = Timestamp::from_epoch_secs(0).unwrap();
        assert_eq!(format!("{ts}"), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::from_epoch_secs(1625097600).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }
}
