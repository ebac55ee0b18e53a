// cybertip-oracle/src/stub.rs
// ============================================================================
// Module: Stub Oracle
// Description: Deterministic, network-free Oracle implementation.
// Purpose: Back `TOOL_MODE=stub` deployments and fast integration tests
//          with canned-but-valid JSON responses per pipeline stage.
// Dependencies: cybertip-core
// ============================================================================

//! ## Overview
//! `StubOracle` never makes an outbound call. It recognizes each stage by
//! the `stage_name` carried on [`AgentRequest`] and returns the minimal
//! valid JSON response that stage's caller expects to deserialize,
//! generalizing the test-only `ScriptedOracle` pattern in [`crate::harness`]
//! into a production-safe, always-available backend.

use cybertip_core::interfaces::AgentRequest;
use cybertip_core::interfaces::Oracle;
use cybertip_core::interfaces::OracleError;

/// Canned-response [`Oracle`] used when no live backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubOracle;

impl StubOracle {
    /// Creates a new stub oracle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Oracle for StubOracle {
    fn run_agent(&self, request: &AgentRequest<'_>) -> Result<String, OracleError> {
        Ok(canned_response(request.stage_name).to_owned())
    }
}

/// Returns the canned JSON response for a given stage name.
fn canned_response(stage_name: &str) -> &'static str {
    match stage_name {
        "wilson_gate" => r#"{"circuit_label":"unknown","confidence":1.0}"#,
        "extraction" => r#"{"identifiers_found":[],"platforms":[],"summary":null}"#,
        "hash_osint" => r#"{"matched_file_ids":[]}"#,
        "classifier" => {
            r#"{"csam_confirmed":false,"minor_age_determined":false,"ongoing_abuse":false,"aig_csam_confirmed":false,"victim_crisis_alert":false,"notes":null}"#
        }
        "linker" => r#"{"duplicate_of":null,"cluster_flags":[],"active_investigation_match":false}"#,
        _ => "{}",
    }
}
