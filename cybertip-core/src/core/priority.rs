// cybertip-core/src/core/priority.rs
// ============================================================================
// Module: CyberTip Priority Model
// Description: Priority tiers and the priority-engine output attached to a tip.
// Purpose: Define the ordered triage tiers and routing outcome shape.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Tiers are strictly ordered `Monitor < Standard < Paused < Urgent <
//! Immediate`; the derive order below is the ordering itself, not just a
//! listing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Priority Tier
// ============================================================================

/// Triage priority tier, ordered `Monitor < Standard < Paused < Urgent <
/// Immediate`.
///
/// # Invariants
/// - Variant declaration order is the `Ord` order; do not reorder variants
///   without re-checking every comparison site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    /// Lowest tier: routine monitoring, no active handling required.
    Monitor,
    /// Routine triage queue.
    Standard,
    /// Held pending deconfliction with an active investigation.
    Paused,
    /// Elevated handling, short response window.
    Urgent,
    /// Highest tier: immediate human attention required.
    Immediate,
}

// ============================================================================
// SECTION: Routing Unit
// ============================================================================

/// Destination unit for a triaged tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingUnit {
    /// Child exploitation investigations unit.
    ChildExploitationUnit,
    /// General cyber-crime unit.
    CyberCrimeUnit,
    /// International liaison / MLAT coordination desk.
    InternationalLiaison,
    /// General triage queue, no specialized routing yet.
    GeneralTriage,
    /// Escalated to a supervisor for manual routing.
    SupervisorReview,
}

// ============================================================================
// SECTION: Priority Result
// ============================================================================

/// Output of the priority engine for a single tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityResult {
    /// Assigned tier.
    pub tier: PriorityTier,
    /// Integer score in `0..=100`.
    pub score: u8,
    /// Destination unit.
    pub routing_unit: RoutingUnit,
    /// Whether a supervisor must be paged immediately.
    pub supervisor_alert: bool,
    /// Human-readable explanation of how the tier/score were derived.
    pub rationale: String,
}

impl PriorityResult {
    /// Safe default used when the priority engine itself fails. Never drops
    /// a tip to the bottom of the queue silently.
    #[must_use]
    pub fn safe_default(rationale: impl Into<String>) -> Self {
        Self {
            tier: PriorityTier::Standard,
            score: 50,
            routing_unit: RoutingUnit::SupervisorReview,
            supervisor_alert: true,
            rationale: rationale.into(),
        }
    }
}
