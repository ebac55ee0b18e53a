// cybertip-core/src/core/mod.rs
// ============================================================================
// Module: CyberTip Core Types
// Description: Canonical CyberTip data model: tips, files, preservation
//              requests, audit entries, legal reference data, and priority
//              outcomes.
// Purpose: Provide stable, serializable types that are the single source of
//          truth for every derived surface (HTTP API, CLI, durable store).
// Dependencies: cybertip-logic, serde
// ============================================================================

//! ## Overview
//! CyberTip core types define the tip aggregate and everything it carries:
//! attached files, preservation requests, the append-only audit trail, and
//! the legal/priority enrichment outputs produced by the pipeline. These
//! types are the canonical source of truth for every derived API surface
//! (HTTP, CLI, or durable storage).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod file;
pub mod hashing;
pub mod identifiers;
pub mod legal;
pub mod preservation;
pub mod priority;
pub mod time;
pub mod tip;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditEntry;
pub use audit::AuditStatus;
pub use audit::by_agent;
pub use audit::by_tip;
pub use file::HashFingerprints;
pub use file::MediaType;
pub use file::TipFile;
pub use file::WarrantStatus;
pub use file::WatchlistVerdicts;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::CircuitRuleId;
pub use identifiers::EntryId;
pub use identifiers::FileId;
pub use identifiers::JobId;
pub use identifiers::NcmecTipNumber;
pub use identifiers::PrecedentId;
pub use identifiers::ProviderId;
pub use identifiers::RequestId;
pub use identifiers::TipId;
pub use identifiers::UpstreamCaseNumber;
pub use legal::ApplicationStandard;
pub use legal::CircuitRule;
pub use legal::LegalStatus;
pub use legal::PrecedentEffect;
pub use legal::PrecedentUpdate;
pub use preservation::PreservationRequest;
pub use preservation::PreservationStatus;
pub use priority::PriorityResult;
pub use priority::PriorityTier;
pub use priority::RoutingUnit;
pub use time::Timestamp;
pub use tip::Classification;
pub use tip::ExtractionResult;
pub use tip::FileWatchlistResult;
pub use tip::HashMatches;
pub use tip::Jurisdiction;
pub use tip::JurisdictionLabel;
pub use tip::Links;
pub use tip::OffenseCategory;
pub use tip::Provenance;
pub use tip::Reporter;
pub use tip::ReporterKind;
pub use tip::Severity;
pub use tip::SourceChannel;
pub use tip::Tip;
pub use tip::TipStatus;
pub use tip::UsIcacSeverity;
pub use tip::VictimAgeRange;
