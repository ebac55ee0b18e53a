// cybertip-core/src/runtime/legal_reference.rs
// ============================================================================
// Module: CyberTip Legal Reference Table
// Description: Mutex-guarded circuit-rule table and append-mostly precedent
//              log consulted by the Wilson Gate.
// Purpose: Hold the live per-circuit legal posture and apply precedent
//          updates atomically.
// Dependencies: crate::core::legal
// ============================================================================

//! ## Overview
//! The live circuit-rule table is held behind a `Mutex` and swapped whole
//! rather than mutated field-by-field through a shared reference, mirroring
//! `runtime::store::InMemoryRunStateStore`'s guard discipline. A
//! [`PrecedentEffect::NowBinding`] update mutates the matching circuit rule
//! in place and must be observed by the very next Wilson Gate decision that
//! consults it; [`PrecedentEffect::Informational`] updates are logged but
//! never change a circuit rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use crate::core::identifiers::CircuitRuleId;
use crate::core::legal::CircuitRule;
use crate::core::legal::PrecedentEffect;
use crate::core::legal::PrecedentUpdate;

// ============================================================================
// SECTION: Legal Reference Table
// ============================================================================

/// Errors surfaced by the legal reference table.
#[derive(Debug, thiserror::Error)]
pub enum LegalReferenceError {
    /// The table's internal mutex was poisoned by a panicking holder.
    #[error("legal reference table mutex poisoned")]
    Poisoned,
    /// No circuit rule with the given identifier exists.
    #[error("no circuit rule with id {0}")]
    UnknownCircuitRule(String),
}

/// Live circuit-rule table and precedent log consulted by the Wilson Gate.
#[derive(Debug, Default)]
pub struct LegalReferenceTable {
    /// Circuit rules, swapped whole under the mutex on each mutation.
    rules: Mutex<Vec<CircuitRule>>,
    /// Append-mostly log of every precedent update ever recorded.
    precedents: Mutex<Vec<PrecedentUpdate>>,
}

impl LegalReferenceTable {
    /// Builds a table seeded with the given circuit rules.
    #[must_use]
    pub fn new(rules: Vec<CircuitRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            precedents: Mutex::new(Vec::new()),
        }
    }

    /// Looks up a circuit rule by label. Returns `None` when no rule on
    /// point exists; callers fall back to a conservative default note
    /// rather than treating this as a hard failure.
    ///
    /// # Errors
    ///
    /// Returns [`LegalReferenceError::Poisoned`] when the internal mutex is
    /// poisoned.
    pub fn rule_for_circuit(&self, circuit_label: &str) -> Result<Option<CircuitRule>, LegalReferenceError> {
        let guard = self.rules.lock().map_err(|_| LegalReferenceError::Poisoned)?;
        Ok(guard.iter().find(|rule| rule.circuit_label == circuit_label).cloned())
    }

    /// Records a precedent update. When `effect ==
    /// [`PrecedentEffect::NowBinding`]`, the matching circuit rule (by
    /// label) is mutated in place; a circuit rule that does not yet exist
    /// for that label is left untouched and the update is still logged.
    ///
    /// # Errors
    ///
    /// Returns [`LegalReferenceError::Poisoned`] when either internal
    /// mutex is poisoned.
    pub fn record_precedent_update(&self, update: PrecedentUpdate) -> Result<(), LegalReferenceError> {
        if matches!(update.effect, PrecedentEffect::NowBinding) {
            let mut rules = self.rules.lock().map_err(|_| LegalReferenceError::Poisoned)?;
            if let Some(rule) = rules.iter_mut().find(|rule| rule.circuit_label == update.circuit_label) {
                rule.binding_precedent = update.summary.clone();
                rule.citations = update.citations.clone();
                rule.last_reviewed = update.recorded_at;
            }
        }

        self.precedents
            .lock()
            .map_err(|_| LegalReferenceError::Poisoned)?
            .push(update);
        Ok(())
    }

    /// Returns the full precedent log, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LegalReferenceError::Poisoned`] when the internal mutex is
    /// poisoned.
    pub fn precedent_log(&self) -> Result<Vec<PrecedentUpdate>, LegalReferenceError> {
        Ok(self
            .precedents
            .lock()
            .map_err(|_| LegalReferenceError::Poisoned)?
            .clone())
    }

    /// Returns a circuit rule by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LegalReferenceError::UnknownCircuitRule`] when no rule with
    /// `rule_id` exists, or [`LegalReferenceError::Poisoned`] on a poisoned
    /// mutex.
    pub fn rule_by_id(&self, rule_id: &CircuitRuleId) -> Result<CircuitRule, LegalReferenceError> {
        let guard = self.rules.lock().map_err(|_| LegalReferenceError::Poisoned)?;
        guard
            .iter()
            .find(|rule| rule.circuit_rule_id == *rule_id)
            .cloned()
            .ok_or_else(|| LegalReferenceError::UnknownCircuitRule(rule_id.as_str().to_owned()))
    }
}
