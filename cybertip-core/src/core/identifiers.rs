// cybertip-core/src/core/identifiers.rs
// ============================================================================
// Module: CyberTip Identifiers
// Description: Canonical opaque identifiers for tips, files, and workflow records.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used
//! throughout the triage pipeline. Identifiers are opaque and serialize as
//! plain strings; validation is handled at ingestion/API boundaries rather
//! than within these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Macro
// ============================================================================

macro_rules! newtype_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

newtype_id!(TipId, "Identifier for a `Tip` aggregate.");
newtype_id!(FileId, "Identifier for a `TipFile`.");
newtype_id!(RequestId, "Identifier for a `PreservationRequest`.");
newtype_id!(EntryId, "Identifier for an `AuditEntry`.");
newtype_id!(JobId, "Identifier for a queued ingestion job.");
newtype_id!(ProviderId, "Identifier for an oracle role/provider.");
newtype_id!(CircuitRuleId, "Identifier for a `CircuitRule`.");
newtype_id!(PrecedentId, "Identifier for a `PrecedentUpdate`.");
newtype_id!(NcmecTipNumber, "NCMEC-issued tip number, when present.");
newtype_id!(UpstreamCaseNumber, "Upstream partner-agency case number, when present.");

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only framing assertions."
    )]

    use super::TipId;

    #[test]
    fn round_trips_through_serde() {
        let id = TipId::new("tip-0001");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"tip-0001\"");
        let back: TipId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_as_str() {
        let id = TipId::from("tip-0002");
        assert_eq!(id.to_string(), id.as_str());
    }
}
