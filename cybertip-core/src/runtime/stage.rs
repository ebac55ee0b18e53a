// cybertip-core/src/runtime/stage.rs
// ============================================================================
// Module: CyberTip Pipeline Stage Outcomes
// Description: The sum type every orchestrator stage resolves to, and the
//              SSE event shape derived from it.
// Purpose: Give every stage a uniform success/error/block result so the
//          orchestrator never needs stage-specific branching to decide
//          whether to continue.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! `StageOutcome<T>` generalizes the teacher's `DecisionOutcome`
//! (Start/Advance/Complete/Hold/Fail) down to the three cases the pipeline
//! actually needs: a stage either produces a value, fails with a recorded
//! detail (and the pipeline continues with that field unset), or the tip is
//! hard-blocked (only the Wilson Gate may return this case).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TipId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Stage Outcome
// ============================================================================

/// Result of running a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    /// The stage produced a value.
    Ok(T),
    /// The stage failed; the pipeline continues with the corresponding
    /// field left unset. Carries a human-readable error detail.
    AgentError(String),
    /// The tip must be hard-blocked; no further stage may run. Only the
    /// Wilson Gate stage is permitted to return this variant.
    Blocked(String),
}

impl<T> StageOutcome<T> {
    /// Returns the contained value, discarding error/blocked detail.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::AgentError(_) | Self::Blocked(_) => None,
        }
    }

    /// True when the stage hard-blocked the tip.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }
}

// ============================================================================
// SECTION: Stage Name
// ============================================================================

/// The fixed pipeline stages, in DAG order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Intake normalization and fingerprinting.
    Intake,
    /// Wilson Gate legal-access evaluation.
    WilsonGate,
    /// Content extraction.
    Extraction,
    /// Hash/OSINT watchlist cross-reference.
    HashOsint,
    /// CSAM/content classifier.
    Classifier,
    /// Cross-tip linking and deconfliction.
    Linker,
    /// Priority assignment.
    Priority,
}

// ============================================================================
// SECTION: SSE Stage Event
// ============================================================================

/// Running status of a stage event, as observed by an SSE subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageEventStatus {
    /// The stage has started.
    Running,
    /// The stage completed successfully.
    Done,
    /// The stage failed.
    Error,
    /// The tip was hard-blocked.
    Blocked,
}

/// A single SSE event emitted while a tip moves through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Tip the event concerns.
    pub tip_id: TipId,
    /// Stage the event concerns.
    pub step: StageName,
    /// Stage status.
    pub status: StageEventStatus,
    /// Event timestamp.
    pub timestamp: Timestamp,
    /// Additional detail, present for `error`/`blocked` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
