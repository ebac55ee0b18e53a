// cybertip-core/src/core/file.rs
// ============================================================================
// Module: CyberTip File Model
// Description: Per-file attachment record, hash fingerprints, and Wilson
//              Gate access state.
// Purpose: Represent a single file attached to a tip and its legal-access
//          state.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A `TipFile` carries both the evidentiary hashes used for watchlist
//! matching and the access-control fields the Wilson Gate maintains.
//! `file_access_blocked` is a derived field: it must always equal
//! `warrant_required && warrant_status != Granted`. Callers that mutate
//! `warrant_required` or `warrant_status` must call
//! [`TipFile::recompute_access_block`] before the file is considered
//! consistent again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FileId;

// ============================================================================
// SECTION: Media Type
// ============================================================================

/// Coarse media classification of an attached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// Still image.
    Image,
    /// Video file.
    Video,
    /// Text or office document.
    Document,
    /// Compressed archive.
    Archive,
    /// Anything not covered above.
    Other,
}

// ============================================================================
// SECTION: Hash Fingerprints
// ============================================================================

/// Content hashes computed for a file, used for watchlist matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashFingerprints {
    /// MD5 digest, hex-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
    /// SHA-1 digest, hex-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// SHA-256 digest, hex-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// PhotoDNA perceptual hash, when computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photodna: Option<String>,
}

// ============================================================================
// SECTION: Warrant Status
// ============================================================================

/// Legal-process status for a file requiring a warrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantStatus {
    /// No warrant is required for this file.
    NotNeeded,
    /// A warrant application is pending preparation.
    PendingApplication,
    /// A warrant application has been filed and is awaiting a ruling.
    Applied,
    /// A warrant has been granted.
    Granted,
    /// A warrant application was denied.
    Denied,
}

// ============================================================================
// SECTION: Watchlist Verdicts
// ============================================================================

/// Watchlist match results for a file's hashes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchlistVerdicts {
    /// Matched against the NCMEC hash database.
    pub ncmec_hash_match: bool,
    /// Matched against Project VIC.
    pub project_vic_match: bool,
    /// Matched against the IWF hash list.
    pub iwf_match: bool,
    /// Matched against INTERPOL ICSE.
    pub interpol_icse_match: bool,
    /// AI-generated CSAM suspected by a classifier.
    pub aig_csam_suspected: bool,
    /// Confidence score for the AIG-CSAM suspicion, `0.0..=1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aig_detection_confidence: Option<f64>,
}

impl WatchlistVerdicts {
    /// True when any watchlist source confirms a match.
    #[must_use]
    pub const fn any_confirmed_match(&self) -> bool {
        self.ncmec_hash_match
            || self.project_vic_match
            || self.iwf_match
            || self.interpol_icse_match
    }
}

// ============================================================================
// SECTION: Tip File
// ============================================================================

/// A single file attached to a tip.
///
/// # Invariants
/// - `file_access_blocked == (warrant_required && warrant_status !=
///   WarrantStatus::Granted)` at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipFile {
    /// File identifier.
    pub file_id: FileId,
    /// Original filename as reported.
    pub filename: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Coarse media classification.
    pub media_type: MediaType,
    /// Content hashes.
    pub hashes: HashFingerprints,
    /// Whether the reporting ESP's staff viewed the file before reporting.
    pub esp_viewed: bool,
    /// Whether the ESP's viewing status is unknown/unreported.
    pub esp_viewed_missing: bool,
    /// Whether the file was publicly available at the time of report.
    pub publicly_available: bool,
    /// Whether a warrant is required before investigators may access this
    /// file's content.
    pub warrant_required: bool,
    /// Current warrant status.
    pub warrant_status: WarrantStatus,
    /// Derived: investigators may not access file content.
    pub file_access_blocked: bool,
    /// Warrant number once applied/granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warrant_number: Option<String>,
    /// Watchlist match verdicts for this file's hashes.
    pub watchlist: WatchlistVerdicts,
}

impl TipFile {
    /// Recomputes `file_access_blocked` from `warrant_required` and
    /// `warrant_status`. Must be called after either field changes.
    pub fn recompute_access_block(&mut self) {
        self.file_access_blocked =
            self.warrant_required && self.warrant_status != WarrantStatus::Granted;
    }
}
