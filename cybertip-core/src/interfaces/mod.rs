// cybertip-core/src/interfaces/mod.rs
// ============================================================================
// Module: CyberTip Interfaces
// Description: Backend-agnostic interfaces for ingestion, the agent harness,
//              persistence, and dispatch.
// Purpose: Define the contract surfaces the orchestrator depends on, so it
//          never branches on which backend is active.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the triage pipeline integrates with external
//! systems without embedding backend-specific details. Implementations must
//! be deterministic where the contract requires it (the Wilson Gate's
//! dependencies are evaluated purely) and must fail closed on missing or
//! invalid data rather than silently substituting a permissive default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::file::WarrantStatus;
use crate::core::identifiers::FileId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::TipId;
use crate::core::preservation::PreservationRequest;
use crate::core::priority::PriorityTier;
use crate::core::priority::RoutingUnit;
use crate::core::time::Timestamp;
use crate::core::tip::SourceChannel;
use crate::core::tip::Tip;
use crate::core::tip::TipStatus;

// ============================================================================
// SECTION: Source Adapter Contract
// ============================================================================

/// Raw content type of an ingested tip, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawContentType {
    /// Extracted text from a PDF.
    PdfText,
    /// XML document.
    Xml,
    /// JSON document.
    Json,
    /// Raw email (headers + body).
    Email,
    /// Plain text.
    Text,
}

/// Unnormalized tip submission as received from a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTipInput {
    /// Ingestion channel.
    pub source: SourceChannel,
    /// Raw content exactly as received.
    pub raw_content: String,
    /// Content type of `raw_content`.
    pub content_type: RawContentType,
    /// Receipt timestamp, when the source provides one. Falls back to
    /// enqueue time otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<Timestamp>,
    /// Arbitrary adapter-supplied metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Source-adapter errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level I/O error.
    #[error("source adapter io error: {0}")]
    Io(String),
    /// The source delivered malformed content.
    #[error("source adapter malformed content: {0}")]
    Malformed(String),
}

/// A backend-agnostic tip source adapter.
pub trait ReporterSource {
    /// The channel this adapter ingests on behalf of.
    fn channel(&self) -> SourceChannel;

    /// Polls for newly available raw tip submissions.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the poll fails.
    fn poll(&mut self) -> Result<Vec<RawTipInput>, SourceError>;
}

// ============================================================================
// SECTION: Agent Harness / Oracle Contract
// ============================================================================

/// Model role band requested for an agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleBand {
    /// Fast, low-cost model tier.
    Fast,
    /// High-capability model tier. Mandatory for the Wilson Gate and
    /// Classifier stages.
    High,
}

/// A tool made available to an agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name as exposed to the model.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: Value,
}

/// Callback invoked by an [`Oracle`] implementation to execute a requested
/// tool call on the caller's behalf.
pub type ToolCallExecutor = dyn Fn(&str, &Value) -> Result<Value, OracleError> + Send + Sync;

/// A single agent invocation request.
pub struct AgentRequest<'a> {
    /// Stage name the invocation is made on behalf of, for audit purposes.
    pub stage_name: &'a str,
    /// Requested role band.
    pub role: RoleBand,
    /// System prompt text.
    pub system_text: &'a str,
    /// User-facing content, already sentinel-wrapped and escaped by the
    /// caller before reaching the oracle.
    pub user_text: &'a str,
    /// Tools available to the model, if any.
    pub tools: Option<&'a [ToolSpec]>,
    /// Tool-call executor, if tools were provided.
    pub execute_tool_call: Option<&'a ToolCallExecutor>,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Maximum tool-call iterations before forcing a final answer.
    pub max_iterations: u32,
    /// Per-invocation timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Oracle (agent harness) errors.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The oracle backend could not be reached.
    #[error("oracle unreachable: {0}")]
    Unreachable(String),
    /// The invocation exceeded `timeout_ms`.
    #[error("oracle invocation timed out after {0}ms")]
    Timeout(u64),
    /// The raw response could not be parsed into the expected shape.
    #[error("oracle returned an unparseable response: {0}")]
    InvalidResponse(String),
    /// A requested tool call failed.
    #[error("oracle tool call failed: {0}")]
    ToolExecution(String),
}

/// Backend-agnostic agent harness.
pub trait Oracle {
    /// Invokes an agent and returns its raw text response.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] when the invocation fails, times out, or the
    /// backend is unreachable. Never silently returns a permissive default.
    fn run_agent(&self, request: &AgentRequest<'_>) -> Result<String, OracleError>;
}

// ============================================================================
// SECTION: Dispatcher (Preservation Letters)
// ============================================================================

/// Dispatch errors for preservation-letter delivery.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The delivery channel could not be reached.
    #[error("dispatch unreachable: {0}")]
    Unreachable(String),
    /// The recipient rejected the delivery.
    #[error("dispatch rejected: {0}")]
    Rejected(String),
}

/// Delivers preservation requests to reporting ESPs.
pub trait Dispatcher {
    /// Sends a preservation letter for the given request.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when delivery fails.
    fn send_preservation_letter(&self, request: &PreservationRequest) -> Result<(), DispatchError>;
}

// ============================================================================
// SECTION: Tip Repository
// ============================================================================

/// Filter parameters for listing tips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipListFilter {
    /// Restrict to a single priority tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<PriorityTier>,
    /// Restrict to a single lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TipStatus>,
    /// Restrict to a single routing unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<RoutingUnit>,
    /// Restrict to tips with an active supervisor/crisis alert.
    pub crisis_only: bool,
    /// Maximum number of results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Number of results to skip, for pagination.
    #[serde(default)]
    pub offset: usize,
}

/// Repository-wide statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStats {
    /// Count of tips with `status == Pending`.
    pub pending: usize,
    /// Count of tips with `status == Triaged`.
    pub triaged: usize,
    /// Count of tips with `status == Assigned`.
    pub assigned: usize,
    /// Count of tips with `status == Closed`.
    pub closed: usize,
    /// Count of tips with `status == ReferredOut`.
    pub referred_out: usize,
    /// Count of tips with `status == Duplicate`.
    pub duplicate: usize,
    /// Count of tips with `status == Blocked`.
    pub blocked: usize,
    /// Total tip count across all statuses.
    pub total: usize,
}

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested tip or file was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A durable-backend I/O error occurred.
    #[error("repository io error: {0}")]
    Io(String),
    /// A write conflicted with concurrent state.
    #[error("repository conflict: {0}")]
    Conflict(String),
}

/// Backend-agnostic tip repository. Implementations back either an
/// in-process ordered map or a durable relational store; callers never
/// branch on which is active.
pub trait TipRepository {
    /// Inserts or replaces a tip. Idempotent: upserting the same logical
    /// tip never duplicates it and never loses fields absent from the new
    /// write unless the new write explicitly clears them.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the write fails.
    fn upsert(&self, tip: &Tip) -> Result<(), RepositoryError>;

    /// Fetches a tip by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the read fails.
    fn get(&self, tip_id: &TipId) -> Result<Option<Tip>, RepositoryError>;

    /// Lists tips matching `filter`, ordered by tier then `received_at`
    /// descending.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the read fails.
    fn list(&self, filter: &TipListFilter) -> Result<Vec<Tip>, RepositoryError>;

    /// Updates a file's warrant status, recomputing `file_access_blocked`
    /// and the aggregate `legal_status` booleans, and appends an audit
    /// entry. Always transactional at the aggregate level.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the tip or file does not
    /// exist, otherwise [`RepositoryError`] on write failure.
    fn update_file_warrant(
        &self,
        tip_id: &TipId,
        file_id: &FileId,
        status: WarrantStatus,
        warrant_number: Option<&str>,
    ) -> Result<(), RepositoryError>;

    /// Marks a preservation request issued. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the request does not
    /// exist, otherwise [`RepositoryError`] on write failure.
    fn issue_preservation_request(
        &self,
        tip_id: &TipId,
        request_id: &RequestId,
    ) -> Result<(), RepositoryError>;

    /// Returns aggregate repository statistics.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] when the read fails.
    fn stats(&self) -> Result<RepositoryStats, RepositoryError>;
}

// ============================================================================
// SECTION: Ingestion Queue
// ============================================================================

/// Queue statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Jobs waiting to be picked up.
    pub waiting: usize,
    /// Jobs currently being processed.
    pub active: usize,
    /// Jobs that completed successfully.
    pub completed: usize,
    /// Jobs that failed permanently.
    pub failed: usize,
    /// Total jobs ever enqueued.
    pub total: usize,
}

/// Queue errors.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A durable-backend I/O error occurred.
    #[error("queue io error: {0}")]
    Io(String),
    /// The queue is at capacity.
    #[error("queue is at capacity")]
    Full,
}

/// Backend-agnostic ingestion queue with fingerprint-based deduplication at
/// the call site (see `runtime::fingerprint`).
pub trait TipQueue {
    /// Enqueues a raw tip submission, returning its job identifier.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the enqueue fails.
    fn enqueue(&self, input: RawTipInput) -> Result<JobId, QueueError>;

    /// Drains the queue, invoking `worker_fn` for each job with up to
    /// `concurrency` jobs in flight at once.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when draining fails.
    fn drain<F>(&self, worker_fn: F, concurrency: usize) -> Result<(), QueueError>
    where
        F: Fn(RawTipInput) + Send + Sync;

    /// Returns current queue statistics.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the read fails.
    fn stats(&self) -> Result<QueueStats, QueueError>;
}
