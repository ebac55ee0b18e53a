// cybertip-core/src/lib.rs
// ============================================================================
// Module: CyberTip Core Library
// Description: Public API surface for the CyberTip triage pipeline core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! CyberTip core provides the tip data model, the Wilson Gate and priority
//! engine, and the seven-stage enrichment orchestrator. It is backend-
//! agnostic and integrates through explicit interfaces (`Oracle`,
//! `Dispatcher`, `TipRepository`, `ReporterSource`, `TipQueue`) rather than
//! embedding into any one agent framework or storage engine.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AgentRequest;
pub use interfaces::DispatchError;
pub use interfaces::Dispatcher;
pub use interfaces::Oracle;
pub use interfaces::OracleError;
pub use interfaces::QueueError;
pub use interfaces::QueueStats;
pub use interfaces::RawContentType;
pub use interfaces::RawTipInput;
pub use interfaces::RepositoryError;
pub use interfaces::RepositoryStats;
pub use interfaces::ReporterSource;
pub use interfaces::RoleBand;
pub use interfaces::SourceError;
pub use interfaces::TipListFilter;
pub use interfaces::TipQueue;
pub use interfaces::TipRepository;
pub use interfaces::ToolCallExecutor;
pub use interfaces::ToolSpec;
pub use runtime::InMemoryTipRepository;
pub use runtime::LegalReferenceError;
pub use runtime::LegalReferenceTable;
pub use runtime::Orchestrator;
pub use runtime::OrchestratorConfig;
pub use runtime::OrchestratorError;
pub use runtime::SharedTipRepository;
pub use runtime::StageEvent;
pub use runtime::StageEventStatus;
pub use runtime::StageName;
pub use runtime::StageOutcome;
pub use runtime::WilsonDecision;
pub use runtime::WilsonTraceEntry;
pub use runtime::assemble_legal_status;
pub use runtime::compute_fingerprint;
pub use runtime::evaluate_file;
pub use runtime::evaluate_priority;
pub use runtime::hard_failure;
