// cybertip-ingest/src/queue.rs
// ============================================================================
// Module: In-Process Tip Queue
// Description: Fingerprint-deduplicated ingestion queue backed by a mutex-
//              guarded deque, drained by a bounded worker-thread pool.
// Purpose: Implement `cybertip_core::interfaces::TipQueue` for in-process
//          deployments.
// Dependencies: cybertip-core, std
// ============================================================================

//! ## Overview
//! Generalizes the broker's channel/mpsc delivery idiom from "dispatch a
//! resolved payload" to "dedup and queue a raw tip submission." Every
//! `enqueue` call computes the submission's fingerprint
//! ([`cybertip_core::runtime::fingerprint::compute_fingerprint`]) before
//! inserting anything: a fingerprint already on file returns the job id of
//! the first occurrence and reports a debug-level diagnostic instead of
//! enqueuing a duplicate job. `drain` runs `worker_fn` across a bounded pool
//! of OS threads; a worker that panics counts as one failed job rather than
//! poisoning the queue.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use cybertip_core::core::identifiers::JobId;
use cybertip_core::core::tip::SourceChannel;
use cybertip_core::interfaces::QueueError;
use cybertip_core::interfaces::QueueStats;
use cybertip_core::interfaces::RawTipInput;
use cybertip_core::interfaces::TipQueue;
use cybertip_core::runtime::fingerprint::compute_fingerprint;

use crate::diagnostics::Diagnostics;
use crate::diagnostics::NoopDiagnostics;

// ============================================================================
// SECTION: Queued Job
// ============================================================================

/// A job waiting to be drained.
struct QueuedJob {
    /// Assigned job identifier.
    job_id: JobId,
    /// Raw submission to be processed.
    input: RawTipInput,
}

// ============================================================================
// SECTION: In-Memory Queue
// ============================================================================

/// In-process, fingerprint-deduplicated [`TipQueue`] implementation.
pub struct InMemoryTipQueue {
    /// Jobs not yet picked up by a worker.
    waiting: Mutex<VecDeque<QueuedJob>>,
    /// Fingerprint to job id, consulted before every insert.
    seen_fingerprints: Mutex<BTreeMap<String, JobId>>,
    /// Jobs currently being processed.
    active: AtomicUsize,
    /// Jobs that completed successfully.
    completed: AtomicUsize,
    /// Jobs that panicked while processing.
    failed: AtomicUsize,
    /// Total jobs ever enqueued, including deduplicated redeliveries.
    total: AtomicUsize,
    /// Monotonic counter used to mint job ids.
    next_job_id: AtomicU64,
    /// Diagnostics sink for dedup-drop events.
    diagnostics: Arc<dyn Diagnostics>,
}

impl InMemoryTipQueue {
    /// Creates a queue that discards diagnostic events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_diagnostics(Arc::new(NoopDiagnostics))
    }

    /// Creates a queue reporting dedup and failure events to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            waiting: Mutex::new(VecDeque::new()),
            seen_fingerprints: Mutex::new(BTreeMap::new()),
            active: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            next_job_id: AtomicU64::new(1),
            diagnostics,
        }
    }

    /// Mints the next job identifier.
    fn mint_job_id(&self) -> JobId {
        let sequence = self.next_job_id.fetch_add(1, Ordering::SeqCst);
        JobId::new(format!("job-{sequence}"))
    }
}

impl Default for InMemoryTipQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TipQueue for InMemoryTipQueue {
    fn enqueue(&self, input: RawTipInput) -> Result<JobId, QueueError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let fingerprint = submission_fingerprint(&input).map_err(QueueError::Io)?;

        let mut seen = self.seen_fingerprints.lock().map_err(|_| {
            QueueError::Io("fingerprint table mutex poisoned".to_string())
        })?;
        if let Some(existing) = seen.get(&fingerprint) {
            self.diagnostics.debug(
                "ingestion_duplicate",
                &format!("fingerprint {fingerprint} already queued as {existing}"),
            );
            return Ok(existing.clone());
        }

        let job_id = self.mint_job_id();
        seen.insert(fingerprint, job_id.clone());
        drop(seen);

        let mut waiting = self
            .waiting
            .lock()
            .map_err(|_| QueueError::Io("waiting queue mutex poisoned".to_string()))?;
        waiting.push_back(QueuedJob { job_id: job_id.clone(), input });
        Ok(job_id)
    }

    fn drain<F>(&self, worker_fn: F, concurrency: usize) -> Result<(), QueueError>
    where
        F: Fn(RawTipInput) + Send + Sync,
    {
        let concurrency = concurrency.max(1);
        let worker_fn = &worker_fn;
        thread::scope(|scope| {
            for _ in 0..concurrency {
                scope.spawn(|| {
                    loop {
                        let next = {
                            let mut waiting = match self.waiting.lock() {
                                Ok(guard) => guard,
                                Err(_) => return,
                            };
                            waiting.pop_front()
                        };
                        let Some(job) = next else { return };
                        self.active.fetch_add(1, Ordering::SeqCst);
                        let outcome =
                            std::panic::catch_unwind(AssertUnwindSafe(|| worker_fn(job.input)));
                        self.active.fetch_sub(1, Ordering::SeqCst);
                        match outcome {
                            Ok(()) => {
                                self.completed.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(_) => {
                                self.failed.fetch_add(1, Ordering::SeqCst);
                                self.diagnostics.debug(
                                    "ingestion_worker_panic",
                                    &format!("job {} panicked during processing", job.job_id),
                                );
                            }
                        }
                    }
                });
            }
        });
        Ok(())
    }

    fn stats(&self) -> Result<QueueStats, QueueError> {
        let waiting = self
            .waiting
            .lock()
            .map_err(|_| QueueError::Io("waiting queue mutex poisoned".to_string()))?
            .len();
        Ok(QueueStats {
            waiting,
            active: self.active.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            total: self.total.load(Ordering::SeqCst),
        })
    }
}

// ============================================================================
// SECTION: Fingerprinting
// ============================================================================

/// Computes the dedup fingerprint for a raw submission, deriving a stable
/// source tag, a whitespace-normalized body, and structural identifiers
/// pulled from adapter-supplied metadata when present.
fn submission_fingerprint(input: &RawTipInput) -> Result<String, String> {
    let source_tag = source_channel_tag(input.source);
    let normalized_body = normalize_body(&input.raw_content);
    let structural_identifiers = metadata_structural_identifiers(input);
    let digest = compute_fingerprint(source_tag, &normalized_body, &structural_identifiers)?;
    Ok(digest.value)
}

/// Returns the stable snake_case tag for a source channel.
const fn source_channel_tag(channel: SourceChannel) -> &'static str {
    match channel {
        SourceChannel::PartnerPortal => "partner_portal",
        SourceChannel::PartnerApi => "partner_api",
        SourceChannel::Email => "email",
        SourceChannel::InterAgency => "inter_agency",
        SourceChannel::PublicWebForm => "public_web_form",
    }
}

/// Collapses runs of whitespace and trims the result, so cosmetic
/// formatting differences do not change the fingerprint.
fn normalize_body(raw_content: &str) -> String {
    raw_content.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts a `structural_identifiers` array from adapter-supplied metadata,
/// when present and shaped as an array of strings.
fn metadata_structural_identifiers(input: &RawTipInput) -> Vec<String> {
    input
        .metadata
        .as_ref()
        .and_then(|value| value.get("structural_identifiers"))
        .and_then(serde_json::Value::as_array)
        .map(|values| {
            values.iter().filter_map(|value| value.as_str().map(str::to_string)).collect()
        })
        .unwrap_or_default()
}
