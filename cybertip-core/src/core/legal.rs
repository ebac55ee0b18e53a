// cybertip-core/src/core/legal.rs
// ============================================================================
// Module: CyberTip Legal Reference Model
// Description: Circuit rules, precedent updates, and Wilson Gate legal-status
//              summaries.
// Purpose: Represent the per-circuit legal posture consulted by the Wilson
//          Gate and the outcome it assembles for a tip.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Circuit rules are value-type snapshots; the live table is held behind a
//! `Mutex` in `runtime::legal_reference` and swapped atomically on update,
//! never mutated through a shared reference. `LegalStatus` is the aggregate
//! Wilson Gate outcome attached to a tip; it never claims exigent
//! circumstances on the system's own authority.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CircuitRuleId;
use crate::core::identifiers::PrecedentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Application Standard
// ============================================================================

/// How strictly a circuit's binding precedent is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStandard {
    /// Binding precedent applied strictly.
    Strict,
    /// Persuasive but not binding; applied conservatively.
    Conservative,
    /// No precedent on point; conservative default applies.
    NoPrecedentConservative,
}

// ============================================================================
// SECTION: Circuit Rule
// ============================================================================

/// Per-circuit legal rule consulted by the Wilson Gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitRule {
    /// Rule identifier.
    pub circuit_rule_id: CircuitRuleId,
    /// Circuit label, e.g. `"9th Circuit"`.
    pub circuit_label: String,
    /// Short description of the binding (or persuasive) precedent.
    pub binding_precedent: String,
    /// How strictly the precedent is applied.
    pub application: ApplicationStandard,
    /// Human-readable file-access standard, surfaced in `legal_note`.
    pub file_access_standard_text: String,
    /// Free-text notes for reviewers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Case citations supporting the rule.
    pub citations: Vec<String>,
    /// When this rule was last reviewed by legal staff.
    pub last_reviewed: Timestamp,
}

// ============================================================================
// SECTION: Precedent Update
// ============================================================================

/// Effect of recording a precedent update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecedentEffect {
    /// The precedent is now binding; the matching circuit rule is mutated
    /// in place and must be observed by the very next Wilson Gate decision.
    NowBinding,
    /// Informational only; logged but does not change any circuit rule.
    Informational,
}

/// An entry in the append-mostly precedent log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedentUpdate {
    /// Entry identifier.
    pub precedent_id: PrecedentId,
    /// Circuit label this update concerns.
    pub circuit_label: String,
    /// Summary of the ruling or update.
    pub summary: String,
    /// Effect on the live circuit-rule table.
    pub effect: PrecedentEffect,
    /// When the update was recorded.
    pub recorded_at: Timestamp,
    /// Name of the legal staff member recording the update.
    pub recorded_by: String,
    /// Supporting citations.
    pub citations: Vec<String>,
}

// ============================================================================
// SECTION: Legal Status
// ============================================================================

/// Aggregate Wilson Gate outcome attached to a tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalStatus {
    /// True once every file's warrant question has been resolved
    /// (granted or denied, no files pending/applied).
    pub all_warrants_resolved: bool,
    /// True iff at least one file has `file_access_blocked == false`.
    pub any_files_accessible: bool,
    /// Human-readable summary of the applicable legal standard.
    pub legal_note: String,
    /// Circuit label consulted, if one was determined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_circuit: Option<String>,
    /// Always `false`: this system never originates an exigent-circumstances
    /// claim; that determination is made by human legal staff.
    pub exigent_circumstances_claimed: bool,
}

impl LegalStatus {
    /// Builds a fully-blocked legal status for a hard Wilson Gate failure
    /// (oracle unreachable, circuit lookup failure). Never fails open.
    #[must_use]
    pub fn hard_failure(note: impl Into<String>) -> Self {
        Self {
            all_warrants_resolved: false,
            any_files_accessible: false,
            legal_note: note.into(),
            relevant_circuit: None,
            exigent_circumstances_claimed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only framing assertions."
    )]

    use super::LegalStatus;

    #[test]
    fn hard_failure_never_claims_file_access_or_exigency() {
        let status = LegalStatus::hard_failure("oracle unreachable");
        assert!(!status.any_files_accessible);
        assert!(!status.exigent_circumstances_claimed);
    }
}
