// cybertip-core/src/runtime/wilson.rs
// ============================================================================
// Module: CyberTip Wilson Gate
// Description: Pure per-file legal-access decision and aggregate legal
//              status assembly.
// Purpose: Decide, deterministically and without side effects, whether a
//          file requires a warrant before investigators may access it, and
//          assemble the tip-level legal status the orchestrator records.
// Dependencies: crate::core::{file, legal, tip}
// ============================================================================

//! ## Overview
//! Generalizes `runtime::gate::GateEvaluator`'s pure per-condition
//! evaluation shape: the Wilson Gate evaluates a fixed three-input boolean
//! table per file rather than an author-specified requirement tree, because
//! its inputs are fixed by the data model rather than supplied per
//! scenario. A circuit-rule overlay may only change the human-readable
//! `legal_note`, never the boolean decision. The oracle may enrich
//! `legal_note` wording but can never flip it either.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::file::TipFile;
use crate::core::file::WarrantStatus;
use crate::core::legal::CircuitRule;
use crate::core::legal::LegalStatus;
use crate::core::tip::Tip;

// ============================================================================
// SECTION: Trace
// ============================================================================

/// A single Wilson Gate check, recorded for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WilsonTraceEntry {
    /// Name of the boolean check performed.
    pub check: &'static str,
    /// Result of the check.
    pub result: bool,
}

// ============================================================================
// SECTION: Per-File Decision
// ============================================================================

/// Outcome of evaluating the Wilson Gate for a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WilsonDecision {
    /// Whether a warrant is required before the file may be accessed.
    pub warrant_required: bool,
    /// Derived: `warrant_required && warrant_status != Granted`.
    pub file_access_blocked: bool,
    /// Human-readable note, possibly overlaid by the active circuit rule.
    pub legal_note: String,
    /// Trace of the boolean checks performed, in evaluation order.
    pub trace: Vec<WilsonTraceEntry>,
}

/// Evaluates the Wilson Gate for a single file.
///
/// `publicly_available == true` or (`esp_viewed == true && esp_viewed_missing
/// == false`) means no warrant is required; otherwise one is. The circuit
/// rule, when present, overlays only `legal_note`.
#[must_use]
pub fn evaluate_file(file: &TipFile, circuit_rule: Option<&CircuitRule>) -> WilsonDecision {
    let mut trace = Vec::new();

    trace.push(WilsonTraceEntry {
        check: "publicly_available",
        result: file.publicly_available,
    });
    trace.push(WilsonTraceEntry {
        check: "esp_viewed_without_missing_flag",
        result: file.esp_viewed && !file.esp_viewed_missing,
    });

    let warrant_required = !(file.publicly_available || (file.esp_viewed && !file.esp_viewed_missing));
    trace.push(WilsonTraceEntry {
        check: "warrant_required",
        result: warrant_required,
    });

    let file_access_blocked =
        warrant_required && file.warrant_status != WarrantStatus::Granted;
    trace.push(WilsonTraceEntry {
        check: "file_access_blocked",
        result: file_access_blocked,
    });

    let legal_note = circuit_rule.map_or_else(
        || default_legal_note(warrant_required),
        |rule| rule.file_access_standard_text.clone(),
    );

    WilsonDecision {
        warrant_required,
        file_access_blocked,
        legal_note,
        trace,
    }
}

/// Default `legal_note` text used when no circuit rule is on point.
fn default_legal_note(warrant_required: bool) -> String {
    if warrant_required {
        "Warrant required; no circuit-specific guidance on file.".to_owned()
    } else {
        "No warrant required under default Wilson criteria.".to_owned()
    }
}

// ============================================================================
// SECTION: Aggregate Legal Status
// ============================================================================

/// Assembles the tip-level legal status from its current files.
///
/// `exigent_circumstances_claimed` is always `false`: this system never
/// originates an exigency claim.
#[must_use]
pub fn assemble_legal_status(tip: &Tip, relevant_circuit: Option<&str>) -> LegalStatus {
    let any_files_accessible = tip.any_files_accessible();
    let all_warrants_resolved = tip.all_warrants_resolved();
    let legal_note = if tip.files.is_empty() {
        "No files attached; no access determination required.".to_owned()
    } else if any_files_accessible {
        "At least one file is accessible to investigators.".to_owned()
    } else {
        "All files currently blocked pending warrant resolution.".to_owned()
    };

    LegalStatus {
        all_warrants_resolved,
        any_files_accessible,
        legal_note,
        relevant_circuit: relevant_circuit.map(ToOwned::to_owned),
        exigent_circumstances_claimed: false,
    }
}

/// Builds the fully-blocked legal status produced by a hard Wilson Gate
/// failure (oracle unreachable, circuit lookup failure). Never fails open.
#[must_use]
pub fn hard_failure(reason: &str) -> LegalStatus {
    LegalStatus::hard_failure(reason)
}

/// True when the Wilson Gate must hard-stop despite a successful oracle
/// call: the oracle's confidence fell below threshold while no file is
/// accessible to investigators and at least one file exists on the tip. A
/// tip with no files attached has nothing to gate on, so it never triggers
/// this stop regardless of confidence.
#[must_use]
pub fn low_confidence_hard_stop(confidence: f64, legal_status: &LegalStatus, tip: &Tip) -> bool {
    confidence < 0.5 && !legal_status.any_files_accessible && !tip.files.is_empty()
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only framing assertions."
    )]

    use super::assemble_legal_status;
    use super::evaluate_file;
    use super::low_confidence_hard_stop;
    use crate::core::file::HashFingerprints;
    use crate::core::file::MediaType;
    use crate::core::file::TipFile;
    use crate::core::file::WarrantStatus;
    use crate::core::file::WatchlistVerdicts;
    use crate::core::identifiers::FileId;
    use crate::core::tip::Tip;

    fn base_file() -> TipFile {
        TipFile {
            file_id: FileId::new("file-1"),
            filename: "evidence.jpg".to_owned(),
            size_bytes: 1024,
            media_type: MediaType::Image,
            hashes: HashFingerprints::default(),
            esp_viewed: false,
            esp_viewed_missing: true,
            publicly_available: false,
            warrant_required: false,
            warrant_status: WarrantStatus::NotNeeded,
            file_access_blocked: false,
            warrant_number: None,
            watchlist: WatchlistVerdicts::default(),
        }
    }

    #[test]
    fn esp_viewed_without_missing_flag_needs_no_warrant() {
        let mut file = base_file();
        file.esp_viewed = true;
        file.esp_viewed_missing = false;
        let decision = evaluate_file(&file, None);
        assert!(!decision.warrant_required);
        assert!(!decision.file_access_blocked);
    }

    #[test]
    fn publicly_available_overrides_esp_viewed_missing() {
        let mut file = base_file();
        file.publicly_available = true;
        file.esp_viewed_missing = true;
        let decision = evaluate_file(&file, None);
        assert!(!decision.warrant_required);
    }

    #[test]
    fn esp_viewed_with_missing_flag_still_requires_a_warrant() {
        let mut file = base_file();
        file.esp_viewed = true;
        file.esp_viewed_missing = true;
        let decision = evaluate_file(&file, None);
        assert!(decision.warrant_required);
        assert!(decision.file_access_blocked);
    }

    #[test]
    fn granted_warrant_unblocks_access() {
        let mut file = base_file();
        file.esp_viewed_missing = true;
        file.warrant_status = WarrantStatus::Granted;
        let decision = evaluate_file(&file, None);
        assert!(decision.warrant_required);
        assert!(!decision.file_access_blocked);
    }

    fn tip_with_files(files: Vec<TipFile>) -> Tip {
        use time::macros::datetime;

        use crate::core::tip::Jurisdiction;
        use crate::core::tip::JurisdictionLabel;
        use crate::core::tip::Provenance;
        use crate::core::tip::Reporter;
        use crate::core::tip::ReporterKind;
        use crate::core::tip::SourceChannel;
        use crate::core::tip::TipStatus;
        use crate::core::time::Timestamp;

        Tip {
            tip_id: crate::core::identifiers::TipId::new("tip-1"),
            ncmec_tip_number: None,
            upstream_case_number: None,
            provenance: Provenance {
                source: SourceChannel::PartnerPortal,
                received_at: Timestamp::from_offset(datetime!(2026-01-15 12:00:00 UTC)),
                raw_body: "raw".to_owned(),
                normalized_body: "raw".to_owned(),
            },
            reporter: Reporter { kind: ReporterKind::Public, esp_name: None, originating_country: None },
            jurisdiction: Jurisdiction {
                primary: JurisdictionLabel::Unknown,
                countries_involved: Vec::new(),
                interpol_flag: false,
                europol_flag: false,
            },
            is_bundled: false,
            bundled_incident_count: 1,
            ncmec_urgent_flag: false,
            status: TipStatus::Pending,
            files,
            preservation_requests: Vec::new(),
            audit: Vec::new(),
            extracted: None,
            hash_matches: None,
            classification: None,
            links: None,
            priority: None,
            legal_status: None,
        }
    }

    fn blocked_file() -> TipFile {
        let mut file = base_file();
        file.warrant_required = true;
        file.warrant_status = WarrantStatus::PendingApplication;
        file.file_access_blocked = true;
        file
    }

    #[test]
    fn low_confidence_hard_stop_fires_with_an_inaccessible_file() {
        let tip = tip_with_files(vec![blocked_file()]);
        let legal_status = assemble_legal_status(&tip, None);
        assert!(!legal_status.any_files_accessible);
        assert!(low_confidence_hard_stop(0.2, &legal_status, &tip));
    }

    #[test]
    fn low_confidence_hard_stop_does_not_fire_above_threshold() {
        let tip = tip_with_files(vec![blocked_file()]);
        let legal_status = assemble_legal_status(&tip, None);
        assert!(!low_confidence_hard_stop(0.9, &legal_status, &tip));
    }

    #[test]
    fn low_confidence_hard_stop_does_not_fire_with_an_accessible_file() {
        let mut file = base_file();
        file.publicly_available = true;
        file.file_access_blocked = false;
        let tip = tip_with_files(vec![file]);
        let legal_status = assemble_legal_status(&tip, None);
        assert!(legal_status.any_files_accessible);
        assert!(!low_confidence_hard_stop(0.1, &legal_status, &tip));
    }

    #[test]
    fn low_confidence_hard_stop_does_not_fire_with_no_files() {
        let tip = tip_with_files(Vec::new());
        let legal_status = assemble_legal_status(&tip, None);
        assert!(!low_confidence_hard_stop(0.0, &legal_status, &tip));
    }
}
