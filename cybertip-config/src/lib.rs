// cybertip-config/src/lib.rs
// ============================================================================
// Module: CyberTip Config Library
// Description: Canonical config model, validation, and artifact generation.
// Purpose: Single source of truth for CyberTip's environment variable surface.
// Dependencies: cybertip-core, serde, thiserror
// ============================================================================

//! ## Overview
//! `cybertip-config` defines the canonical environment-driven configuration
//! model for CyberTip. It provides strict, fail-closed validation and
//! deterministic generators for a config schema, an example `.env`, and
//! operator-facing docs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod docs;
pub mod examples;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use docs::config_docs_markdown;
pub use docs::verify_config_docs;
pub use docs::write_config_docs;
pub use examples::env_example;
pub use schema::config_schema;
