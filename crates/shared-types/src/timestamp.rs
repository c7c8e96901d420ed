//! # Timestamps
//!
//! UTC instants with nanosecond resolution, serialised RFC3339 with a `Z`
//! suffix (`2024-05-01T12:00:00.000000001Z`). The wall clock is not assumed
//! monotonic: a forward jump expires locks early, a backward jump extends
//! their validity, and lock refresh is the recovery mechanism for both.

use crate::errors::TimestampError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A UTC instant with nanosecond resolution and a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current wall-clock instant. Monotonic in practice, not by
    /// contract.
    pub fn now() -> Self {
        Timestamp(Utc::now())
    }

    /// Wrap an existing chrono instant.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }

    /// The underlying chrono instant.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Canonical RFC3339-nanosecond rendering with `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// This instant shifted forward by `duration`.
    pub fn checked_add(&self, duration: Duration) -> Result<Self, TimestampError> {
        let delta =
            chrono::Duration::from_std(duration).map_err(|_| TimestampError::Overflow)?;
        self.0
            .checked_add_signed(delta)
            .map(Timestamp)
            .ok_or(TimestampError::Overflow)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(input)
            .map(|dt| Timestamp(dt.with_timezone(&Utc)))
            .map_err(|e| TimestampError::Parse {
                input: input.to_string(),
                message: e.to_string(),
            })
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
