// cybertip-core/src/core/tip.rs
// ============================================================================
// Module: CyberTip Aggregate
// Description: The tip aggregate root and its enrichment-stage output fields.
// Purpose: Represent a single cybertip report end-to-end through the triage
//          pipeline, from intake through priority assignment.
// Dependencies: crate::core::{audit, file, identifiers, legal, preservation,
//               priority, time}, serde
// ============================================================================

//! ## Overview
//! `Tip` is the aggregate root, generalizing the teacher's single-root,
//! append-only-log shape (`RunState`) from "run" to "tip". Every mutation
//! that changes observable state is expected to append an
//! [`crate::core::audit::AuditEntry`] to `audit`; nothing may remove or
//! reorder existing entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::audit::AuditEntry;
use crate::core::file::TipFile;
use crate::core::identifiers::FileId;
use crate::core::identifiers::NcmecTipNumber;
use crate::core::identifiers::TipId;
use crate::core::identifiers::UpstreamCaseNumber;
use crate::core::legal::LegalStatus;
use crate::core::preservation::PreservationRequest;
use crate::core::priority::PriorityResult;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Provenance
// ============================================================================

/// Source channel a tip was ingested through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceChannel {
    /// A partner agency's web portal.
    PartnerPortal,
    /// A partner agency's programmatic API.
    PartnerApi,
    /// Email submission.
    Email,
    /// Inter-agency referral.
    InterAgency,
    /// Public-facing web form.
    PublicWebForm,
}

/// Where a tip originated and the raw content it arrived with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Ingestion channel.
    pub source: SourceChannel,
    /// When the tip was received, sourced from the adapter when provided,
    /// otherwise from enqueue time.
    pub received_at: Timestamp,
    /// Raw body as submitted, truncated to a bounded length for storage.
    pub raw_body: String,
    /// Normalized body used for fingerprinting and downstream enrichment.
    pub normalized_body: String,
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Category of the entity that filed the tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterKind {
    /// An electronic service provider.
    Esp,
    /// Another law-enforcement or partner agency.
    PartnerAgency,
    /// A member of the public.
    Public,
    /// NCMEC itself.
    Ncmec,
}

/// The entity that filed the tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    /// Reporter category.
    pub kind: ReporterKind,
    /// ESP name, present when `kind == Esp`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esp_name: Option<String>,
    /// Originating country, ISO 3166-2, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_country: Option<String>,
}

// ============================================================================
// SECTION: Jurisdiction
// ============================================================================

/// Primary jurisdiction label for a tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionLabel {
    /// United States, federal jurisdiction.
    UsFederal,
    /// A United States state jurisdiction.
    UsState,
    /// A United States local jurisdiction.
    UsLocal,
    /// A non-US jurisdiction.
    InternationalOther,
    /// Jurisdiction not yet determined.
    Unknown,
}

/// Jurisdiction profile for a tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// Primary jurisdiction label.
    pub primary: JurisdictionLabel,
    /// ISO country codes of every country involved.
    pub countries_involved: Vec<String>,
    /// Whether an INTERPOL flag applies.
    pub interpol_flag: bool,
    /// Whether a Europol flag applies.
    pub europol_flag: bool,
}

// ============================================================================
// SECTION: Tip Status
// ============================================================================

/// Lifecycle status of a tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipStatus {
    /// Awaiting or undergoing triage.
    Pending,
    /// Triage complete, awaiting assignment.
    Triaged,
    /// Assigned to an investigator.
    Assigned,
    /// Closed.
    Closed,
    /// Referred to another agency.
    ReferredOut,
    /// Identified as a duplicate of an existing tip.
    Duplicate,
    /// Blocked pending human legal review; forbids every workflow action
    /// except completing that review.
    Blocked,
}

// ============================================================================
// SECTION: Enrichment Outputs
// ============================================================================

/// Free-form extraction output from the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Identifiers (usernames, emails, phone numbers) found in the body.
    pub identifiers_found: Vec<String>,
    /// Platforms mentioned or implicated.
    pub platforms: Vec<String>,
    /// Free-text extraction summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Per-file watchlist verdict produced by the hash/OSINT stage, folded onto
/// the matching [`TipFile::watchlist`] by the orchestrator once this stage
/// completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileWatchlistResult {
    /// File this verdict applies to.
    pub file_id: FileId,
    /// Matched against the NCMEC hash database.
    #[serde(default)]
    pub ncmec_hash_match: bool,
    /// Matched against Project VIC.
    #[serde(default)]
    pub project_vic_match: bool,
    /// Matched against the IWF hash list.
    #[serde(default)]
    pub iwf_match: bool,
    /// Matched against INTERPOL ICSE.
    #[serde(default)]
    pub interpol_icse_match: bool,
    /// AI-generated CSAM suspected by a classifier.
    #[serde(default)]
    pub aig_csam_suspected: bool,
    /// Confidence score for the AIG-CSAM suspicion, `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aig_detection_confidence: Option<f64>,
}

/// Hash/OSINT watchlist cross-reference output at the tip level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashMatches {
    /// File IDs with at least one confirmed watchlist match.
    pub matched_file_ids: Vec<String>,
    /// Per-file watchlist verdicts; kept in lockstep with `files[*].watchlist`.
    #[serde(default)]
    pub per_file_results: Vec<FileWatchlistResult>,
}

/// US-ICAC offense severity rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsIcacSeverity {
    /// No urgent child-safety concern identified.
    P4Low,
    /// Elevated concern, no confirmed minor victim.
    P3Medium,
    /// Confirmed offense, minor victim not yet age-ranged.
    P2High,
    /// Confirmed CSAM offense against an identified or age-ranged minor.
    /// Once set, nothing may compute this back down.
    P1Critical,
}

impl Default for UsIcacSeverity {
    fn default() -> Self {
        Self::P4Low
    }
}

/// Offense category assigned by the classifier.
///
/// Kept deliberately small: only `Csam` drives a deterministic severity
/// floor. Every other offense type the classifier may describe in free text
/// falls to `Other` without losing that text, via `Classification::notes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffenseCategory {
    /// Child sexual abuse material.
    Csam,
    /// Anything outside the CSAM category.
    Other,
}

impl Default for OffenseCategory {
    fn default() -> Self {
        Self::Other
    }
}

/// A victim age bracket extracted from the report body, drawn from the
/// fixed minor-age banding used for the child-safety severity floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictimAgeRange {
    /// 0-2 years.
    Range0To2,
    /// 3-5 years.
    Range3To5,
    /// 6-9 years.
    Range6To9,
    /// 10-12 years.
    Range10To12,
    /// 13-15 years.
    Range13To15,
    /// 16-17 years.
    Range16To17,
}

/// Classification severity block, separate from the priority engine's own
/// tier override: `us_icac` is a property of the classification itself and
/// is surfaced to investigators regardless of how the tip is routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    /// US-ICAC severity rating.
    pub us_icac: UsIcacSeverity,
}

/// Classifier output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Confirmed CSAM determination.
    pub csam_confirmed: bool,
    /// Minor-age determination.
    pub minor_age_determined: bool,
    /// Ongoing-abuse indicator.
    pub ongoing_abuse: bool,
    /// AI-generated CSAM confirmed (as opposed to merely suspected).
    pub aig_csam_confirmed: bool,
    /// A victim-crisis alert was raised by the classifier.
    pub victim_crisis_alert: bool,
    /// Offense category this report was classified under.
    #[serde(default)]
    pub offense_category: OffenseCategory,
    /// Victim age brackets extracted from the report body.
    #[serde(default)]
    pub victim_age_ranges: Vec<VictimAgeRange>,
    /// Severity block, including the US-ICAC rating.
    #[serde(default)]
    pub severity: Severity,
    /// Free-text classifier notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Classification {
    /// Applies the child-safety severity floor: a CSAM offense against any
    /// extracted minor age bracket forces `severity.us_icac = P1Critical`,
    /// overriding any lower computed value. Never lowers an already-set
    /// `P1Critical`.
    pub fn apply_child_safety_floor(&mut self) {
        if self.offense_category == OffenseCategory::Csam && !self.victim_age_ranges.is_empty() {
            self.severity.us_icac = UsIcacSeverity::P1Critical;
        }
    }
}

/// Linker-stage cross-tip relationships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Canonical tip this one duplicates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<TipId>,
    /// Cluster labels this tip was grouped under by the background scan.
    pub cluster_flags: Vec<String>,
    /// Whether the linker matched this tip to an active investigation,
    /// triggering deconfliction pause in the priority engine.
    pub active_investigation_match: bool,
}

// ============================================================================
// SECTION: Tip Aggregate
// ============================================================================

/// The tip aggregate root.
///
/// # Invariants
/// 1. `audit` is append-only; no operation may remove or reorder entries.
/// 2. Every `TipFile` in `files` satisfies `file_access_blocked ==
///    (warrant_required && warrant_status != Granted)`.
/// 3. `status == Blocked` forbids every workflow action except completing
///    human legal review.
/// 4. `priority.tier == Paused` implies `status == Pending`.
/// 5. Confirmed CSAM combined with a minor-age determination forces
///    `priority.tier == Immediate` and `priority.score >= 95`.
/// 6. `legal_status.any_files_accessible` is true iff at least one file has
///    `file_access_blocked == false`, and every file whose watchlist
///    verdict confirms a match is reflected in `hash_matches`.
/// 7. If `classification.offense_category == Csam` and
///    `classification.victim_age_ranges` is non-empty,
///    `classification.severity.us_icac == P1Critical`; this floor can only
///    raise a lower computed value, never lower one already at `P1Critical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    /// Tip identifier.
    pub tip_id: TipId,
    /// NCMEC-issued tip number, when the tip originated from or was
    /// referred through NCMEC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncmec_tip_number: Option<NcmecTipNumber>,
    /// Upstream partner-agency case number, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_case_number: Option<UpstreamCaseNumber>,
    /// Ingestion provenance.
    pub provenance: Provenance,
    /// Who filed the report.
    pub reporter: Reporter,
    /// Jurisdiction profile.
    pub jurisdiction: Jurisdiction,
    /// Whether this tip represents a bundle of multiple incidents.
    pub is_bundled: bool,
    /// Count of incidents bundled into this tip, `1` when not bundled.
    pub bundled_incident_count: u32,
    /// NCMEC urgent flag, when set by the source.
    pub ncmec_urgent_flag: bool,
    /// Lifecycle status.
    pub status: TipStatus,
    /// Attached files.
    pub files: Vec<TipFile>,
    /// Preservation requests issued (or drafted) for this tip.
    pub preservation_requests: Vec<PreservationRequest>,
    /// Append-only audit trail.
    pub audit: Vec<AuditEntry>,
    /// Extraction-stage output, unset until that stage runs successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted: Option<ExtractionResult>,
    /// Hash/OSINT stage output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_matches: Option<HashMatches>,
    /// Classifier-stage output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    /// Linker-stage output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Priority-engine output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityResult>,
    /// Wilson Gate legal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<LegalStatus>,
}

impl Tip {
    /// Appends an audit entry, assigning the next sequence number for this
    /// tip. The only sanctioned way to grow `audit`.
    pub fn push_audit_entry(&mut self, mut entry: AuditEntry) {
        let next_seq = self.audit.last().map_or(1, |last| last.seq + 1);
        entry.seq = next_seq;
        self.audit.push(entry);
    }

    /// True iff at least one file is currently accessible to investigators.
    #[must_use]
    pub fn any_files_accessible(&self) -> bool {
        self.files.iter().any(|file| !file.file_access_blocked)
    }

    /// True once every file's warrant question has been resolved: no file
    /// is left in `PendingApplication` or `Applied`.
    #[must_use]
    pub fn all_warrants_resolved(&self) -> bool {
        use crate::core::file::WarrantStatus;
        self.files.iter().all(|file| {
            !file.warrant_required
                || matches!(
                    file.warrant_status,
                    WarrantStatus::Granted | WarrantStatus::Denied | WarrantStatus::NotNeeded
                )
        })
    }
}
