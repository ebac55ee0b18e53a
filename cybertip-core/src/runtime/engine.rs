// cybertip-core/src/runtime/engine.rs
// ============================================================================
// Module: CyberTip Triage Orchestrator
// Description: The seven-stage enrichment pipeline: intake, Wilson Gate,
//              extraction, hash/OSINT, classifier, linker, priority.
// Purpose: Drive a raw tip submission through every enrichment stage to a
//          fully triaged `Tip`, emitting SSE stage events and retrying
//          transient oracle failures with backoff.
// Dependencies: crate::{core, interfaces, runtime}, tokio
// ============================================================================

//! ## Overview
//! Generalizes `runtime::engine::ControlPlane`'s single canonical execution
//! path from an author-specified stage DAG to the fixed seven-stage
//! pipeline: Intake, Wilson Gate, Extraction, Hash/OSINT, Classifier,
//! Linker, Priority. Extraction and Hash/OSINT run concurrently once Wilson
//! Gate clears a tip for further processing, and Classifier and Linker run
//! concurrently once Extraction and Hash/OSINT both complete, exactly as
//! `tokio::join!` expresses a fan-out/fan-in point. Every oracle-backed
//! stage retries transient failures with exponential backoff before
//! recording [`crate::runtime::stage::StageOutcome::AgentError`]; the Wilson
//! Gate alone may record
//! [`crate::runtime::stage::StageOutcome::Blocked`], and only after
//! exhausting its (longer) retry budget, never on the first failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::core::audit::AuditEntry;
use crate::core::audit::AuditStatus;
use crate::core::file::TipFile;
use crate::core::identifiers::EntryId;
use crate::core::identifiers::FileId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::TipId;
use crate::core::legal::CircuitRule;
use crate::core::preservation::PreservationRequest;
use crate::core::preservation::PreservationStatus;
use crate::core::time::Timestamp;
use crate::core::tip::Classification;
use crate::core::tip::ExtractionResult;
use crate::core::tip::HashMatches;
use crate::core::tip::Jurisdiction;
use crate::core::tip::JurisdictionLabel;
use crate::core::tip::Links;
use crate::core::tip::Provenance;
use crate::core::tip::Reporter;
use crate::core::tip::ReporterKind;
use crate::core::tip::Tip;
use crate::core::tip::TipStatus;
use crate::interfaces::AgentRequest;
use crate::interfaces::Dispatcher;
use crate::interfaces::DispatchError;
use crate::interfaces::Oracle;
use crate::interfaces::OracleError;
use crate::interfaces::RawTipInput;
use crate::interfaces::RepositoryError;
use crate::interfaces::RoleBand;
use crate::interfaces::TipRepository;
use crate::runtime::fingerprint::compute_fingerprint;
use crate::runtime::legal_reference::LegalReferenceError;
use crate::runtime::legal_reference::LegalReferenceTable;
use crate::runtime::priority_engine::evaluate_priority;
use crate::runtime::stage::StageEvent;
use crate::runtime::stage::StageEventStatus;
use crate::runtime::stage::StageName;
use crate::runtime::stage::StageOutcome;
use crate::runtime::wilson;

// ============================================================================
// SECTION: Orchestrator Configuration
// ============================================================================

/// Retry/backoff and demo-mode configuration for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Base backoff delay before the first retry.
    pub retry_base: Duration,
    /// Multiplicative backoff factor applied per retry.
    pub retry_factor: u32,
    /// Maximum attempts (including the first) for an ordinary stage.
    pub max_attempts: u32,
    /// Maximum attempts for the Wilson Gate's extended retry budget.
    pub wilson_gate_max_attempts: u32,
    /// When set, every oracle-backed stage is bypassed with a deterministic
    /// canned result, for local demos and fast integration tests.
    pub demo_mode: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retry_base: Duration::from_secs(2),
            retry_factor: 2,
            max_attempts: 3,
            wilson_gate_max_attempts: 5,
            demo_mode: false,
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives a raw tip submission through the full enrichment pipeline.
pub struct Orchestrator<O, D, R> {
    /// Agent harness invoked for every oracle-backed stage.
    oracle: O,
    /// Outbound dispatcher used for preservation letters and notifications.
    dispatcher: D,
    /// Backing store for tip state, persisted at every stage boundary.
    repository: R,
    /// Live circuit-rule table consulted by the Wilson Gate, shared with
    /// callers that expose it over the legal-reference surface so a
    /// precedent update is observed by the very next Wilson Gate decision.
    legal_reference: Arc<LegalReferenceTable>,
    /// Retry/backoff and demo-mode configuration.
    config: OrchestratorConfig,
    /// Broadcast channel for SSE stage events, lazily created on first subscribe.
    events: Option<tokio::sync::broadcast::Sender<StageEvent>>,
}

impl<O, D, R> Orchestrator<O, D, R>
where
    O: Oracle + Send + Sync,
    D: Dispatcher + Send + Sync,
    R: TipRepository + Send + Sync,
{
    /// Builds a new orchestrator over the given backends.
    #[must_use]
    pub fn new(
        oracle: O,
        dispatcher: D,
        repository: R,
        legal_reference: Arc<LegalReferenceTable>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            oracle,
            dispatcher,
            repository,
            legal_reference,
            config,
            events: None,
        }
    }

    /// Subscribes to stage events emitted by every `process` call on this
    /// orchestrator, for SSE delivery.
    pub fn subscribe(&mut self) -> tokio::sync::broadcast::Receiver<StageEvent> {
        let sender = self
            .events
            .get_or_insert_with(|| tokio::sync::broadcast::channel(256).0);
        sender.subscribe()
    }

    /// Returns the live circuit-rule table this orchestrator's Wilson Gate
    /// consults, shared so callers can serve legal-reference reads/writes
    /// against the exact same state.
    #[must_use]
    pub fn legal_reference(&self) -> Arc<LegalReferenceTable> {
        Arc::clone(&self.legal_reference)
    }

    /// Runs a raw tip submission through intake, Wilson Gate, extraction,
    /// hash/OSINT, classifier, linker, and priority assignment, persisting
    /// the result through the repository at every stage boundary.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] when the repository itself cannot be
    /// read or written; individual stage failures are recorded on the tip
    /// rather than propagated, except a hard Wilson Gate failure, which
    /// still returns the (fully blocked) tip rather than an error.
    pub async fn process(&self, tip_id: TipId, input: RawTipInput) -> Result<Tip, OrchestratorError> {
        let mut tip = self.intake(tip_id, input)?;
        self.persist(&tip)?;

        let wilson_outcome = self.run_wilson_gate(&mut tip).await;
        self.emit(&tip, StageName::WilsonGate, &wilson_outcome);
        if let StageOutcome::Blocked(detail) = &wilson_outcome {
            tip.status = TipStatus::Blocked;
            tip.push_audit_entry(system_audit_entry(&tip, AuditStatus::Blocked, detail.clone()));
            self.persist(&tip)?;
            return Ok(tip);
        }
        self.persist(&tip)?;

        let (extraction, hash_matches) = tokio::join!(
            self.run_extraction(&tip),
            self.run_hash_osint(&tip),
        );
        self.apply_outcome(&mut tip, StageName::Extraction, extraction, |tip, value| {
            tip.extracted = Some(value);
        });
        self.apply_outcome(&mut tip, StageName::HashOsint, hash_matches, |tip, value| {
            fold_watchlist_results(tip, &value);
            tip.hash_matches = Some(value);
        });
        self.persist(&tip)?;

        let (classification, links) =
            tokio::join!(self.run_classifier(&tip), self.run_linker(&tip));
        self.apply_outcome(&mut tip, StageName::Classifier, classification, |tip, mut value| {
            value.apply_child_safety_floor();
            tip.classification = Some(value);
        });
        self.apply_outcome(&mut tip, StageName::Linker, links, |tip, value| {
            tip.links = Some(value);
        });
        self.persist(&tip)?;

        self.run_priority(&mut tip);
        self.emit(
            &tip,
            StageName::Priority,
            &StageOutcome::Ok::<()>(()),
        );

        if tip.priority.as_ref().is_some_and(|priority| priority.tier == crate::core::priority::PriorityTier::Paused)
        {
            tip.status = TipStatus::Pending;
        } else if tip.status == TipStatus::Pending {
            tip.status = TipStatus::Triaged;
        }

        self.persist(&tip)?;
        Ok(tip)
    }

    // ------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------

    /// Builds the initial tip record from a raw submission and records the
    /// intake audit entry.
    fn intake(&self, tip_id: TipId, input: RawTipInput) -> Result<Tip, OrchestratorError> {
        let received_at = input.received_at.unwrap_or_else(Timestamp::now);
        let normalized_body = normalize_body(&input.raw_content);
        let fingerprint = compute_fingerprint(source_tag(input.source), &normalized_body, &[])
            .map_err(OrchestratorError::Fingerprint)?;

        let reporter = Reporter {
            kind: reporter_kind_for_source(input.source),
            esp_name: input
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.get("esp_name"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
            originating_country: input
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.get("originating_country"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
        };

        let mut tip = Tip {
            tip_id,
            ncmec_tip_number: None,
            upstream_case_number: None,
            provenance: Provenance {
                source: input.source,
                received_at,
                raw_body: input.raw_content,
                normalized_body,
            },
            reporter,
            jurisdiction: Jurisdiction {
                primary: JurisdictionLabel::Unknown,
                countries_involved: Vec::new(),
                interpol_flag: false,
                europol_flag: false,
            },
            is_bundled: false,
            bundled_incident_count: 1,
            ncmec_urgent_flag: false,
            status: TipStatus::Pending,
            files: Vec::new(),
            preservation_requests: Vec::new(),
            audit: Vec::new(),
            extracted: None,
            hash_matches: None,
            classification: None,
            links: None,
            priority: None,
            legal_status: None,
        };

        tip.push_audit_entry(AuditEntry {
            entry_id: EntryId::new(format!("intake-{}", fingerprint.value)),
            tip_id: tip.tip_id.clone(),
            seq: 0,
            agent: "intake".to_owned(),
            timestamp: received_at,
            duration_ms: None,
            status: AuditStatus::Success,
            summary: format!("ingested via {:?} with fingerprint {}", tip.provenance.source, fingerprint.value),
            model_used: None,
            error_detail: None,
            human_actor: None,
            previous_value: None,
            new_value: None,
        });

        self.emit(&tip, StageName::Intake, &StageOutcome::Ok::<()>(()));
        Ok(tip)
    }

    // ------------------------------------------------------------------
    // Wilson Gate
    // ------------------------------------------------------------------

    /// Resolves the relevant circuit, applies the per-file warrant decision,
    /// assembles the tip's legal status, and auto-generates a preservation
    /// request when warranted.
    async fn run_wilson_gate(&self, tip: &mut Tip) -> StageOutcome<()> {
        if self.config.demo_mode {
            tip.legal_status = Some(wilson::assemble_legal_status(tip, None));
            return StageOutcome::Ok(());
        }

        let response = match self
            .retry(self.config.wilson_gate_max_attempts, || {
                self.invoke_oracle::<CircuitLabelResponse>(
                    "wilson_gate",
                    RoleBand::High,
                    "Determine the most relevant federal circuit for this tip's jurisdiction.",
                    &tip.provenance.normalized_body,
                )
            })
            .await
        {
            Ok(response) => response,
            Err(_) => {
                tip.legal_status = Some(wilson::hard_failure("oracle unreachable during Wilson Gate evaluation"));
                return StageOutcome::Blocked("oracle unreachable during Wilson Gate evaluation".to_owned());
            }
        };
        let circuit_label = response.circuit_label;

        let circuit_rule = match self.legal_reference.rule_for_circuit(&circuit_label) {
            Ok(rule) => rule,
            Err(LegalReferenceError::Poisoned) => {
                tip.legal_status = Some(wilson::hard_failure("circuit lookup failure"));
                return StageOutcome::Blocked("circuit lookup failure".to_owned());
            }
            Err(LegalReferenceError::UnknownCircuitRule(_)) => None,
        };

        for file in &mut tip.files {
            apply_wilson_decision(file, circuit_rule.as_ref());
        }

        let legal_status = wilson::assemble_legal_status(tip, Some(circuit_label.as_str()));
        if wilson::low_confidence_hard_stop(response.confidence, &legal_status, tip) {
            tip.legal_status = Some(wilson::hard_failure(
                "Wilson Gate confidence below threshold with no accessible files; human legal review required",
            ));
            return StageOutcome::Blocked(
                "Wilson Gate returned low-confidence guidance with no accessible files".to_owned(),
            );
        }

        tip.legal_status = Some(legal_status);
        self.auto_generate_preservation(tip);
        StageOutcome::Ok(())
    }

    /// Drafts and dispatches a preservation letter for an ESP reporter when
    /// no request already targets that ESP.
    fn auto_generate_preservation(&self, tip: &mut Tip) {
        if tip.reporter.kind != ReporterKind::Esp {
            return;
        }
        let Some(esp_name) = tip.reporter.esp_name.clone() else {
            return;
        };
        if tip.preservation_requests.iter().any(|request| request.esp_name == esp_name) {
            return;
        }

        let request = PreservationRequest {
            request_id: RequestId::new(format!("preservation-{}", tip.tip_id.as_str())),
            tip_id: tip.tip_id.clone(),
            esp_name,
            account_identifiers: Vec::new(),
            legal_basis: "18 U.S.C. 2703(f)".to_owned(),
            jurisdiction: tip.jurisdiction.primary,
            deadline: tip.provenance.received_at.plus_days(90),
            status: PreservationStatus::Draft,
            auto_generated: true,
            letter: None,
            approver: None,
        };

        if self.dispatcher.send_preservation_letter(&request).is_ok() {
            let mut issued = request.clone();
            issued.issue();
            tip.preservation_requests.push(issued);
        } else {
            tip.preservation_requests.push(request);
        }
    }

    // ------------------------------------------------------------------
    // Extraction / Hash-OSINT / Classifier / Linker
    // ------------------------------------------------------------------

    /// Runs the extraction stage, or a canned result in demo mode.
    async fn run_extraction(&self, tip: &Tip) -> StageOutcome<ExtractionResult> {
        if self.config.demo_mode {
            return StageOutcome::Ok(ExtractionResult::default());
        }
        self.run_oracle_stage(StageName::Extraction, tip, RoleBand::Fast, "Extract identifiers and platforms mentioned in this report.")
            .await
    }

    /// Runs the hash/OSINT stage, or a canned result in demo mode.
    async fn run_hash_osint(&self, tip: &Tip) -> StageOutcome<HashMatches> {
        if self.config.demo_mode {
            return StageOutcome::Ok(HashMatches::default());
        }
        self.run_oracle_stage(
            StageName::HashOsint,
            tip,
            RoleBand::Fast,
            "Cross-reference each attached file's hashes against watchlist sources and return a \
             per-file verdict keyed by file_id.",
        )
        .await
    }

    /// Runs the classifier stage, or a canned result in demo mode.
    async fn run_classifier(&self, tip: &Tip) -> StageOutcome<Classification> {
        if self.config.demo_mode {
            return StageOutcome::Ok(Classification::default());
        }
        self.run_oracle_stage(
            StageName::Classifier,
            tip,
            RoleBand::High,
            "Classify this report's content for CSAM, minor-age, and ongoing-abuse indicators, \
             including the offense category and any extracted victim age ranges.",
        )
        .await
    }

    /// Runs the linker stage, or a canned result in demo mode.
    async fn run_linker(&self, tip: &Tip) -> StageOutcome<Links> {
        if self.config.demo_mode {
            return StageOutcome::Ok(Links::default());
        }
        self.run_oracle_stage(StageName::Linker, tip, RoleBand::Fast, "Identify cross-tip duplicates or active-investigation matches.")
            .await
    }

    /// Invokes the oracle for an ordinary (non-Wilson-Gate) stage, retrying
    /// transient failures, and maps the outcome onto [`StageOutcome`].
    async fn run_oracle_stage<T>(
        &self,
        stage: StageName,
        tip: &Tip,
        role: RoleBand,
        instructions: &str,
    ) -> StageOutcome<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self
            .retry(self.config.max_attempts, || {
                self.invoke_oracle::<T>(stage_label(stage), role, instructions, &tip.provenance.normalized_body)
            })
            .await
        {
            Ok(value) => StageOutcome::Ok(value),
            Err(err) => StageOutcome::AgentError(err.to_string()),
        }
    }

    /// Builds an [`AgentRequest`] and parses the oracle's raw response as
    /// JSON.
    async fn invoke_oracle<T>(
        &self,
        stage_name: &str,
        role: RoleBand,
        system_text: &str,
        user_text: &str,
    ) -> Result<T, OracleError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = AgentRequest {
            stage_name,
            role,
            system_text,
            user_text,
            tools: None,
            execute_tool_call: None,
            max_tokens: 4096,
            max_iterations: 1,
            timeout_ms: 30_000,
        };
        let raw = self.oracle.run_agent(&request)?;
        serde_json::from_str(&raw).map_err(|err| OracleError::InvalidResponse(err.to_string()))
    }

    /// Retries `make_call` with exponential backoff until it succeeds or
    /// `max_attempts` is exhausted.
    async fn retry<F, Fut, T>(&self, max_attempts: u32, mut make_call: F) -> Result<T, OracleError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, OracleError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match make_call().await {
                Ok(value) => return Ok(value),
                Err(_err) if attempt < max_attempts => {
                    let delay = self.config.retry_base * self.config.retry_factor.pow(attempt - 1);
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    // ------------------------------------------------------------------
    // Priority
    // ------------------------------------------------------------------

    /// Assigns the tip's priority tier, score, and routing unit.
    fn run_priority(&self, tip: &mut Tip) {
        let base_score = if tip.ncmec_urgent_flag { 70 } else { 30 };
        let result = evaluate_priority(tip.classification.as_ref(), tip.links.as_ref(), base_score);
        tip.priority = Some(result);
    }

    // ------------------------------------------------------------------
    // Shared Helpers
    // ------------------------------------------------------------------

    /// Emits the stage event, records an audit entry on agent error, and
    /// applies a successful stage result onto the tip.
    fn apply_outcome<T>(
        &self,
        tip: &mut Tip,
        stage: StageName,
        outcome: StageOutcome<T>,
        apply: impl FnOnce(&mut Tip, T),
    ) {
        self.emit(tip, stage, &outcome);
        if let StageOutcome::AgentError(detail) = &outcome {
            tip.push_audit_entry(system_audit_entry(tip, AuditStatus::AgentError, detail.clone()));
        }
        if let StageOutcome::Ok(value) = outcome {
            apply(tip, value);
        }
    }

    /// Broadcasts a stage event to subscribers, if any are listening.
    fn emit<T>(&self, tip: &Tip, stage: StageName, outcome: &StageOutcome<T>) {
        let Some(sender) = &self.events else {
            return;
        };
        let (status, detail) = match outcome {
            StageOutcome::Ok(_) => (StageEventStatus::Done, None),
            StageOutcome::AgentError(detail) => (StageEventStatus::Error, Some(detail.clone())),
            StageOutcome::Blocked(detail) => (StageEventStatus::Blocked, Some(detail.clone())),
        };
        let _ = sender.send(StageEvent {
            tip_id: tip.tip_id.clone(),
            step: stage,
            status,
            timestamp: tip.provenance.received_at,
            detail,
        });
    }

    /// Writes the current tip state through to the repository.
    fn persist(&self, tip: &Tip) -> Result<(), OrchestratorError> {
        self.repository.upsert(tip).map_err(OrchestratorError::Repository)
    }
}

/// Applies the Wilson Gate's per-file decision onto a file's warrant fields.
fn apply_wilson_decision(file: &mut TipFile, circuit_rule: Option<&CircuitRule>) {
    let decision = wilson::evaluate_file(file, circuit_rule);
    file.warrant_required = decision.warrant_required;
    file.file_access_blocked = decision.file_access_blocked;
}

/// Folds the hash/OSINT stage's per-file watchlist verdicts onto the
/// matching `TipFile`s, keeping `files[*].watchlist` consistent with
/// `hash_matches` as invariant 6 requires.
fn fold_watchlist_results(tip: &mut Tip, hash_matches: &HashMatches) {
    for result in &hash_matches.per_file_results {
        let Some(file) = tip.files.iter_mut().find(|file| file.file_id == result.file_id) else {
            continue;
        };
        file.watchlist.ncmec_hash_match = result.ncmec_hash_match;
        file.watchlist.project_vic_match = result.project_vic_match;
        file.watchlist.iwf_match = result.iwf_match;
        file.watchlist.interpol_icse_match = result.interpol_icse_match;
        file.watchlist.aig_csam_suspected = result.aig_csam_suspected;
        file.watchlist.aig_detection_confidence = result.aig_detection_confidence;
    }
}

/// Builds an orchestrator-authored audit entry for a pipeline-level event.
fn system_audit_entry(tip: &Tip, status: AuditStatus, detail: String) -> AuditEntry {
    AuditEntry {
        entry_id: EntryId::new(format!("pipeline-{}", tip.audit.len() + 1)),
        tip_id: tip.tip_id.clone(),
        seq: 0,
        agent: "orchestrator".to_owned(),
        timestamp: tip.provenance.received_at,
        duration_ms: None,
        status,
        summary: detail.clone(),
        model_used: None,
        error_detail: Some(detail),
        human_actor: None,
        previous_value: None,
        new_value: None,
    }
}

/// Collapses runs of whitespace in a raw submission body.
fn normalize_body(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable tag for a source channel, used as fingerprint salt.
fn source_tag(source: crate::core::tip::SourceChannel) -> &'static str {
    match source {
        crate::core::tip::SourceChannel::PartnerPortal => "partner_portal",
        crate::core::tip::SourceChannel::PartnerApi => "partner_api",
        crate::core::tip::SourceChannel::Email => "email",
        crate::core::tip::SourceChannel::InterAgency => "inter_agency",
        crate::core::tip::SourceChannel::PublicWebForm => "public_web_form",
    }
}

/// Maps the adapter channel a tip arrived on to its reporter category.
///
/// Partner portals and APIs are ESP-operated intake channels; inter-agency
/// referrals come from another law-enforcement partner; email and public web
/// forms are treated as public submissions absent stronger evidence.
const fn reporter_kind_for_source(source: crate::core::tip::SourceChannel) -> ReporterKind {
    match source {
        crate::core::tip::SourceChannel::PartnerPortal | crate::core::tip::SourceChannel::PartnerApi => {
            ReporterKind::Esp
        }
        crate::core::tip::SourceChannel::InterAgency => ReporterKind::PartnerAgency,
        crate::core::tip::SourceChannel::Email | crate::core::tip::SourceChannel::PublicWebForm => {
            ReporterKind::Public
        }
    }
}

/// Stable stage name passed to the oracle as the agent request's stage tag.
fn stage_label(stage: StageName) -> &'static str {
    match stage {
        StageName::Intake => "intake",
        StageName::WilsonGate => "wilson_gate",
        StageName::Extraction => "extraction",
        StageName::HashOsint => "hash_osint",
        StageName::Classifier => "classifier",
        StageName::Linker => "linker",
        StageName::Priority => "priority",
    }
}

/// Oracle response shape for the Wilson Gate's circuit-label request.
#[derive(Debug, Deserialize)]
struct CircuitLabelResponse {
    /// The circuit the oracle determined is most relevant.
    circuit_label: String,
    /// The oracle's confidence in its determination, `0.0..=1.0`. Absent
    /// responses default to full confidence so older oracle adapters that
    /// never return this field cannot trigger the low-confidence hard-stop.
    #[serde(default = "default_confidence")]
    confidence: f64,
}

/// Default confidence used when an oracle response omits the field.
const fn default_confidence() -> f64 {
    1.0
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Orchestrator execution errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Fingerprint computation failed during intake.
    #[error("fingerprint computation failed: {0}")]
    Fingerprint(String),
    /// Repository read/write failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// Preservation-letter dispatch failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
