// cybertip-core/src/core/time.rs
// ============================================================================
// Module: CyberTip Timestamps
// Description: UTC timestamp wrapper used across the triage pipeline.
// Purpose: Provide a single, serializable time representation (RFC 3339).
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! All timestamps in the triage pipeline are server-side UTC. `received_at`
//! is sourced from the adapter when the source provides one, otherwise from
//! enqueue time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC timestamp, serialized as RFC 3339.
///
/// # Invariants
/// - Always represents a UTC instant; no local-time offsets are carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Wraps an existing `OffsetDateTime`, normalizing it to UTC.
    #[must_use]
    pub fn from_offset(value: OffsetDateTime) -> Self {
        Self(value.to_offset(time::UtcOffset::UTC))
    }

    /// Returns the current UTC instant. Used as the enqueue-time fallback
    /// for `Provenance::received_at` when a source adapter supplies none.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Returns the underlying `OffsetDateTime`.
    #[must_use]
    pub const fn as_offset_datetime(&self) -> OffsetDateTime {
        self.0
    }

    /// Adds a whole number of days, used for preservation-request deadlines.
    #[must_use]
    pub fn plus_days(&self, days: i64) -> Self {
        Self(self.0 + time::Duration::days(days))
    }

    /// Parses an RFC 3339 timestamp string.
    ///
    /// # Errors
    ///
    /// Returns an error when `value` is not a valid RFC 3339 timestamp.
    pub fn parse(value: &str) -> Result<Self, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).map(Self::from_offset)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => Err(fmt::Error),
        }
    }
}

use std::fmt;

/// Serde helpers serializing `OffsetDateTime` as RFC 3339 strings.
mod rfc3339 {
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    /// Serializes `value` as an RFC 3339 string.
    pub fn serialize<S: Serializer>(value: &OffsetDateTime, ser: S) -> Result<S::Ok, S::Error> {
        let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        ser.serialize_str(&formatted)
    }

    /// Parses an RFC 3339 string into an `OffsetDateTime`.
    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(de)?;
        OffsetDateTime::parse(&raw, &Rfc3339).map_err(serde::de::Error::custom)
    }
}
