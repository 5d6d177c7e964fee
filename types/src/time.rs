//! Timestamp type used throughout the orchestrator.
//!
//! NEAR block timestamps are nanoseconds since the Unix epoch and are
//! returned by the lockup contract as JSON decimal strings. A value of zero
//! means "no unlock in progress".

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TypeError;

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanoseconds since the Unix epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampNs(u64);

impl TimestampNs {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Get the current system time as a `TimestampNs`.
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_nanos() as u64;
        Self(nanos)
    }

    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Whether this deadline has passed relative to `now`.
    pub fn is_reached(&self, now: TimestampNs) -> bool {
        now.0 >= self.0
    }

    /// Nanoseconds still to wait until this deadline (zero if passed).
    pub fn remaining_since(&self, now: TimestampNs) -> u64 {
        self.0.saturating_sub(now.0)
    }

    /// Human-readable countdown until this deadline, e.g. `"2d 3h 15m 7s"`.
    /// Returns `"ready"` once the deadline has passed.
    pub fn format_remaining(&self, now: TimestampNs) -> String {
        let remaining = self.remaining_since(now);
        if remaining == 0 {
            return "ready".to_string();
        }
        let secs = remaining / NANOS_PER_SEC;
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3_600;
        let minutes = (secs % 3_600) / 60;
        let seconds = secs % 60;
        format!("{days}d {hours}h {minutes}m {seconds}s")
    }

    /// Parse a contract-reported timestamp. `None` and `"0"` both mean
    /// "no unlock in progress" and map to `None`.
    pub fn from_contract_value(value: Option<&str>) -> Result<Option<Self>, TypeError> {
        match value {
            None | Some("0") => Ok(None),
            Some(s) => s
                .parse::<u64>()
                .map(|n| Some(Self(n)))
                .map_err(|e| TypeError::InvalidTimestamp(format!("{s:?}: {e}"))),
        }
    }
}

impl fmt::Display for TimestampNs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl Serialize for TimestampNs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TimestampNs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u64>().map(Self).map_err(D::Error::custom)
    }
}
