// cybertip-oracle/src/lib.rs
// ============================================================================
// Module: CyberTip Oracle
// Description: HTTP-backed Agent Harness implementing the Oracle contract.
// Purpose: Invoke LLM-backed judgment for pipeline stages safely.
// Dependencies: cybertip-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! This crate implements the Agent Harness / Oracle contract declared in
//! [`cybertip_core::interfaces`]. [`AgentHarness`] is the entry point pipeline
//! stages use: it sentinel-wraps untrusted tip content, retries transient
//! backend failures with exponential backoff, and extracts JSON from the raw
//! response. [`HttpOracle`] is the concrete transport, and [`OracleRegistry`]
//! routes a request to the backend configured for its role band.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod harness;
pub mod http;
pub mod json;
pub mod registry;
pub mod retry;
pub mod sentinel;
pub mod stub;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use harness::AgentHarness;
pub use harness::Invocation;
pub use harness::InvocationOutcome;
pub use http::HttpOracle;
pub use http::HttpOracleConfig;
pub use json::JsonExtractionError;
pub use json::extract_json;
pub use registry::OracleRegistry;
pub use retry::RetryOutcome;
pub use retry::RetryPolicy;
pub use retry::run_with_retry;
pub use sentinel::InjectionFinding;
pub use sentinel::detect_injection_patterns;
pub use sentinel::escape_xml;
pub use sentinel::wrap_untrusted_content;
pub use stub::StubOracle;
