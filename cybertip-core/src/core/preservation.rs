// cybertip-core/src/core/preservation.rs
// ============================================================================
// Module: CyberTip Preservation Request Model
// Description: Data-preservation letters issued to reporting ESPs.
// Purpose: Represent a preservation request and its lifecycle.
// Dependencies: crate::core::{identifiers, time, tip}, serde
// ============================================================================

//! ## Overview
//! Preservation requests are auto-generated per ESP with a finite retention
//! window (`deadline = received_at + retention_days`, see
//! `Timestamp::plus_days`). Issuing an already-issued request is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RequestId;
use crate::core::identifiers::TipId;
use crate::core::time::Timestamp;
use crate::core::tip::JurisdictionLabel;

// ============================================================================
// SECTION: Preservation Status
// ============================================================================

/// Lifecycle status of a preservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreservationStatus {
    /// Generated but not yet sent.
    Draft,
    /// Sent to the ESP.
    Issued,
    /// ESP confirmed receipt/compliance.
    Confirmed,
    /// Retention window elapsed without confirmation.
    Expired,
}

// ============================================================================
// SECTION: Preservation Request
// ============================================================================

/// A data-preservation request directed at a reporting ESP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservationRequest {
    /// Request identifier.
    pub request_id: RequestId,
    /// Owning tip.
    pub tip_id: TipId,
    /// Name of the ESP the request is directed at.
    pub esp_name: String,
    /// Account identifiers (usernames, emails, numeric IDs) to preserve.
    pub account_identifiers: Vec<String>,
    /// Label for the legal basis of the request (e.g. `"18 U.S.C. 2703(f)"`).
    pub legal_basis: String,
    /// Jurisdiction the request is issued under.
    pub jurisdiction: JurisdictionLabel,
    /// Preservation deadline.
    pub deadline: Timestamp,
    /// Current lifecycle status.
    pub status: PreservationStatus,
    /// Whether this request was generated automatically by the priority
    /// engine rather than requested by a human.
    pub auto_generated: bool,
    /// Rendered letter text, once generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<String>,
    /// Name of the human who approved issuance, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
}

impl PreservationRequest {
    /// Marks the request issued. A no-op if already issued or further along.
    pub fn issue(&mut self) {
        if matches!(self.status, PreservationStatus::Draft) {
            self.status = PreservationStatus::Issued;
        }
    }
}
