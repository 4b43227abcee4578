//! Entity timestamps with microsecond precision.
//!
//! Timestamps are zone-less and always rendered in the canonical text form
//! `YYYY-MM-DDTHH:MM:SS.ffffff`. Sub-microsecond precision is dropped at
//! creation so that rendering and parsing round-trip exactly.

use chrono::{NaiveDateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical text format used by records and the file store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// `%.6f` tolerates a missing fraction when parsing; `.%6f` requires all six digits.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Current UTC wall time, truncated to microseconds.
    pub fn now() -> Self {
        Self::from_naive(Utc::now().naive_utc())
    }

    pub fn from_naive(value: NaiveDateTime) -> Self {
        Self(value.trunc_subsecs(6))
    }

    /// Parse canonical timestamp text.
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text, PARSE_FORMAT).map(Self::from_naive)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Current time, forced strictly past `self`.
    ///
    /// When the clock has not moved (or moved backwards) the result is `self`
    /// plus one microsecond.
    pub fn advanced(&self) -> Self {
        let now = Self::now();
        if now > *self {
            now
        } else {
            Self(self.0 + TimeDelta::microseconds(1))
        }
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl core::str::FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
