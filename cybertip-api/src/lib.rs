// cybertip-api/src/lib.rs
// ============================================================================
// Module: CyberTip API
// Description: HTTP/SSE surface over the triage pipeline orchestrator.
// Purpose: Expose tip queue/detail/assignment/warrant/preservation/legal
//          operations to investigator tooling.
// Dependencies: cybertip-core, cybertip-config, cybertip-oracle,
//               cybertip-store-sqlite, cybertip-ingest, axum, tokio
// ============================================================================

//! ## Overview
//! CyberTip API wraps [`cybertip_core::runtime::Orchestrator`] in an axum
//! [`Router`](axum::Router) with per-tip SSE stage-event streaming, a bounded
//! inflight limiter, a fixed-window rate limiter, and structured request
//! audit logging, mirroring the teacher's MCP server scaffolding.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod dispatch;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ApiAuditEvent;
pub use audit::ApiAuditEventParams;
pub use audit::ApiAuditSink;
pub use audit::ApiFileAuditSink;
pub use audit::ApiNoopAuditSink;
pub use audit::ApiStderrAuditSink;
pub use dispatch::LoggingDispatcher;
pub use server::ApiServer;
pub use server::ApiServerError;
