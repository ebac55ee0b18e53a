// cybertip-core/src/runtime/priority_engine.rs
// ============================================================================
// Module: CyberTip Priority Engine
// Description: Mandatory-override tiering followed by monotone score
//              cutoffs, with a safe-default failure path.
// Purpose: Assign a priority tier, score, and routing unit to a tip given
//          its classification and linker outputs.
// Dependencies: cybertip_logic, crate::core::{tip, priority}
// ============================================================================

//! ## Overview
//! Mandatory overrides are evaluated before the monotone score cutoffs,
//! using `cybertip_logic`'s fail-closed tri-state evaluation
//! (`TriState`/`TriLogic`) for override conditions whose evidence may be
//! unknown at evaluation time: an unknown input is never silently treated
//! as false. A priority-engine failure produces
//! [`crate::core::priority::PriorityResult::safe_default`], never a silent
//! drop to the bottom of the queue.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cybertip_logic::LogicMode;
use cybertip_logic::TriLogic;
use cybertip_logic::TriState;

use crate::core::priority::PriorityResult;
use crate::core::priority::PriorityTier;
use crate::core::priority::RoutingUnit;
use crate::core::tip::Classification;
use crate::core::tip::Links;
use crate::core::tip::UsIcacSeverity;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lifts a known boolean into a tri-state value.
const fn bool_to_tri(value: bool) -> TriState {
    if value { TriState::True } else { TriState::False }
}

/// Maps a priority tier to the unit that should work it.
fn routing_unit_for(tier: PriorityTier) -> RoutingUnit {
    match tier {
        PriorityTier::Immediate | PriorityTier::Urgent => RoutingUnit::ChildExploitationUnit,
        PriorityTier::Paused | PriorityTier::Standard | PriorityTier::Monitor => {
            RoutingUnit::GeneralTriage
        }
    }
}

// ============================================================================
// SECTION: Priority Evaluation
// ============================================================================

/// Evaluates the priority engine for a tip given its enrichment outputs and
/// a starting integer score (produced upstream, e.g. by the classifier).
#[must_use]
pub fn evaluate_priority(
    classification: Option<&Classification>,
    links: Option<&Links>,
    score: u8,
) -> PriorityResult {
    let logic = LogicMode::Kleene;

    let victim_crisis_alert =
        classification.map_or(TriState::Unknown, |c| bool_to_tri(c.victim_crisis_alert));
    let deconfliction =
        links.map_or(TriState::Unknown, |l| bool_to_tri(l.active_investigation_match));
    let csam_confirmed = classification.map_or(TriState::Unknown, |c| bool_to_tri(c.csam_confirmed));
    let minor_age_determined =
        classification.map_or(TriState::Unknown, |c| bool_to_tri(c.minor_age_determined));
    let ongoing_abuse = classification.map_or(TriState::Unknown, |c| bool_to_tri(c.ongoing_abuse));
    let aig_csam_confirmed =
        classification.map_or(TriState::Unknown, |c| bool_to_tri(c.aig_csam_confirmed));
    let child_safety_floor_hit =
        classification.map_or(TriState::Unknown, |c| bool_to_tri(c.severity.us_icac == UsIcacSeverity::P1Critical));

    let csam_and_minor = logic.and(csam_confirmed, minor_age_determined);
    let csam_mandatory_override = logic.or(csam_and_minor, child_safety_floor_hit);
    let urgent_floor = logic.or(ongoing_abuse, aig_csam_confirmed);

    // Evaluated in the order the overrides are listed: victim-crisis alert
    // first, deconfliction second, the child-safety floor third, the
    // ongoing-abuse/AIG floor fourth. `TriState::Unknown` is never treated
    // as "no override" for the first two; it escalates exactly like `True`.
    if victim_crisis_alert != TriState::False {
        return PriorityResult {
            tier: PriorityTier::Immediate,
            score: score.max(95),
            routing_unit: RoutingUnit::ChildExploitationUnit,
            supervisor_alert: true,
            rationale: rationale_for(victim_crisis_alert, "victim crisis alert"),
        };
    }

    if deconfliction != TriState::False {
        return PriorityResult {
            tier: PriorityTier::Paused,
            score,
            routing_unit: RoutingUnit::GeneralTriage,
            supervisor_alert: matches!(deconfliction, TriState::Unknown),
            rationale: rationale_for(deconfliction, "active-investigation deconfliction"),
        };
    }

    if csam_mandatory_override == TriState::True {
        let rationale = if child_safety_floor_hit == TriState::True && csam_and_minor != TriState::True {
            "classification severity floor at P1_CRITICAL (CSAM, age-ranged minor victim)".to_owned()
        } else {
            "confirmed CSAM with a minor-age determination".to_owned()
        };
        return PriorityResult {
            tier: PriorityTier::Immediate,
            score: score.max(95),
            routing_unit: RoutingUnit::ChildExploitationUnit,
            supervisor_alert: true,
            rationale,
        };
    }

    let (mut tier, mut routing_unit) = monotone_tier(score);
    let mut supervisor_alert = false;
    let mut rationale = format!("score-based tier assignment at score {score}");

    if urgent_floor != TriState::False && tier < PriorityTier::Urgent {
        tier = PriorityTier::Urgent;
        routing_unit = routing_unit_for(tier);
        supervisor_alert = matches!(urgent_floor, TriState::Unknown);
        rationale = rationale_for(urgent_floor, "ongoing abuse or AIG-CSAM confirmation");
    }

    PriorityResult {
        tier,
        score,
        routing_unit,
        supervisor_alert,
        rationale,
    }
}

/// Score-based tier cutoffs applied once no mandatory override has fired.
fn monotone_tier(score: u8) -> (PriorityTier, RoutingUnit) {
    let tier = if score >= 85 {
        PriorityTier::Immediate
    } else if score >= 65 {
        PriorityTier::Urgent
    } else if score >= 40 {
        PriorityTier::Standard
    } else {
        PriorityTier::Monitor
    };
    (tier, routing_unit_for(tier))
}

/// Renders the rationale text for a non-false override condition.
fn rationale_for(value: TriState, label: &str) -> String {
    match value {
        TriState::True => format!("{label} confirmed"),
        TriState::Unknown => format!("{label} unknown; escalated conservatively"),
        TriState::False => unreachable!("rationale_for is only called on non-false overrides"),
    }
}
