// cybertip-ingest/src/diagnostics.rs
// ============================================================================
// Module: Ingestion Diagnostics
// Description: Operational (non-audit) diagnostic hooks for the ingest path.
// Purpose: Let queue/source operators observe drop and poll events without
//          growing a Tip's audit trail for events that precede a Tip.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Fingerprint-deduplicated redeliveries and source-poll failures happen
//! before a `Tip` aggregate exists, so they cannot be recorded as
//! `AuditEntry` values. [`Diagnostics`] is a thin, dependency-free sink for
//! this class of event, mirroring the MCP server's metrics trait: a
//! production sink writes to stderr, and [`NoopDiagnostics`] discards
//! everything for tests.

// ============================================================================
// SECTION: Diagnostics Trait
// ============================================================================

/// Sink for operational diagnostics that precede or fall outside a `Tip`'s
/// audit trail.
pub trait Diagnostics: Send + Sync {
    /// Records a debug-level diagnostic event.
    fn debug(&self, event: &str, detail: &str);
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Diagnostics sink that writes events to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    #[allow(clippy::print_stderr, reason = "Diagnostics are intentionally routed to stderr.")]
    fn debug(&self, event: &str, detail: &str) {
        eprintln!("[debug] {event}: {detail}");
    }
}

/// Diagnostics sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn debug(&self, _event: &str, _detail: &str) {}
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only framing assertions.")]

    use super::Diagnostics;
    use super::NoopDiagnostics;

    #[test]
    fn noop_diagnostics_accepts_any_event_without_panicking() {
        let sink = NoopDiagnostics;
        sink.debug("ingestion_duplicate", "fingerprint already seen");
    }
}
