// cybertip-core/src/core/audit.rs
// ============================================================================
// Module: CyberTip Audit Model
// Description: Append-only audit entries recorded against a tip.
// Purpose: Provide a single, totally-ordered audit-entry shape for every
//          stage transition, Wilson Gate decision, and human override.
// Dependencies: crate::core::{identifiers, time}, serde, serde_json
// ============================================================================

//! ## Overview
//! `AuditEntry` generalizes the teacher's `DecisionRecord`/`ToolCallRecord`
//! shape (monotonic sequence number plus timestamp and outcome) into a
//! single entry type shared by every stage. Ordering is by `seq`, which is
//! assigned by the repository at append time and never reused or reordered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::EntryId;
use crate::core::identifiers::TipId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Audit Status
// ============================================================================

/// Outcome recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// The recorded action completed normally.
    Success,
    /// An oracle/agent stage failed; the tip continues with that stage's
    /// output left unset.
    AgentError,
    /// The tip was blocked (Wilson Gate hard-stop or equivalent).
    Blocked,
    /// Informational entry with no success/failure semantics of its own.
    Info,
}

// ============================================================================
// SECTION: Audit Entry
// ============================================================================

/// A single append-only entry in a tip's audit trail.
///
/// # Invariants
/// - `seq` is assigned once by the repository at append time and is never
///   reused, reordered, or decremented within a tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier.
    pub entry_id: EntryId,
    /// Owning tip.
    pub tip_id: TipId,
    /// Monotonic sequence number within the owning tip.
    pub seq: u64,
    /// Name of the stage/agent/actor responsible for this entry.
    pub agent: String,
    /// When the entry was recorded.
    pub timestamp: Timestamp,
    /// Wall-clock duration of the recorded action, if applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Outcome of the recorded action.
    pub status: AuditStatus,
    /// Short human-readable summary.
    pub summary: String,
    /// Oracle model identifier, when the entry records an oracle call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    /// Error detail, present when `status == AgentError`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Name of the human actor, present for human-initiated overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_actor: Option<String>,
    /// Field value before the change, for change-tracking entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_value: Option<Value>,
    /// Field value after the change, for change-tracking entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

// ============================================================================
// SECTION: Audit Log Queries
// ============================================================================

/// Returns a tip's audit trail in its natural order: ascending by `seq`.
///
/// `Tip::push_audit_entry` only ever appends with a strictly increasing
/// sequence number, so the stored order already satisfies this contract.
#[must_use]
pub fn by_tip(entries: &[AuditEntry]) -> &[AuditEntry] {
    entries
}

/// Returns up to `limit` entries recorded by `agent`, most-recent-first.
#[must_use]
pub fn by_agent<'entries>(entries: &'entries [AuditEntry], agent: &str, limit: usize) -> Vec<&'entries AuditEntry> {
    entries.iter().rev().filter(|entry| entry.agent == agent).take(limit).collect()
}
