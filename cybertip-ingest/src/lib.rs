// cybertip-ingest/src/lib.rs
// ============================================================================
// Module: CyberTip Ingest Library
// Description: Source adapters, fingerprint-deduplicated queue, and cluster
//              scan for the ingestion path.
// Purpose: Turn external submissions into queued `RawTipInput` jobs ready
//          for the enrichment pipeline.
// Dependencies: cybertip-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! CyberTip Ingest provides the adapters and queue primitive that sit in
//! front of the enrichment pipeline. [`source`] implements
//! `cybertip_core::interfaces::ReporterSource` once per channel family,
//! [`queue`] deduplicates and holds submissions pending processing, and
//! [`cluster`] groups tips sharing structural identifiers for operators to
//! apply on a schedule. [`diagnostics`] carries operational events that
//! precede a `Tip` aggregate and so cannot live on its audit trail.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cluster;
pub mod diagnostics;
pub mod queue;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cluster::ClusterAssignment;
pub use cluster::ClusterCandidate;
pub use cluster::scan_for_clusters;
pub use diagnostics::Diagnostics;
pub use diagnostics::NoopDiagnostics;
pub use diagnostics::StderrDiagnostics;
pub use queue::InMemoryTipQueue;
pub use source::FileDropSource;
pub use source::HttpPollConfig;
pub use source::HttpPollSource;
pub use source::InlineQueueSource;
pub use source::RawContentType;
pub use source::RawTipInput;
pub use source::ReporterSource;
pub use source::SourceError;
