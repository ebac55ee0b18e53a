// cybertip-core/src/runtime/mod.rs
// ============================================================================
// Module: CyberTip Runtime
// Description: The enrichment pipeline orchestrator, Wilson Gate, priority
//              engine, legal reference table, and in-memory repository.
// Purpose: Execute the triage pipeline against agent and repository
//          backends provided by the surrounding application.
// Dependencies: crate::{core, interfaces}, cybertip_logic
// ============================================================================

//! ## Overview
//! Runtime modules implement the deterministic and oracle-backed stages of
//! the triage pipeline. Every external surface (CLI, HTTP/SSE API, tests)
//! drives the same [`engine::Orchestrator`] to preserve the pipeline's
//! invariants.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod fingerprint;
pub mod legal_reference;
pub mod memory_store;
pub mod priority_engine;
pub mod stage;
pub mod wilson;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::Orchestrator;
pub use engine::OrchestratorConfig;
pub use engine::OrchestratorError;
pub use fingerprint::compute_fingerprint;
pub use legal_reference::LegalReferenceError;
pub use legal_reference::LegalReferenceTable;
pub use memory_store::InMemoryTipRepository;
pub use memory_store::SharedTipRepository;
pub use priority_engine::evaluate_priority;
pub use stage::StageEvent;
pub use stage::StageEventStatus;
pub use stage::StageName;
pub use stage::StageOutcome;
pub use wilson::WilsonDecision;
pub use wilson::WilsonTraceEntry;
pub use wilson::assemble_legal_status;
pub use wilson::evaluate_file;
pub use wilson::hard_failure;
