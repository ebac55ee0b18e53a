// cybertip-api/src/audit.rs
// ============================================================================
// Module: HTTP/SSE Request Audit Logging
// Description: Structured audit events for REST/SSE request handling.
// Purpose: Emit one audit record per inbound request without a hard
//          dependency on any particular logging pipeline.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every handler records one [`ApiAuditEvent`] through an [`ApiAuditSink`],
//! mirroring the teacher's per-request MCP audit record but carrying the
//! REST method/path/status in place of a JSON-RPC method/tool pair.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Audit Event
// ============================================================================

/// One REST/SSE request's audit record.
#[derive(Debug, Clone, Serialize)]
pub struct ApiAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier, assigned per request.
    pub request_id: String,
    /// HTTP method.
    pub method: String,
    /// Request path (route template, not the raw URI).
    pub route: String,
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Response status code.
    pub status: u16,
    /// Error kind label, present on non-2xx responses.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock handler latency in milliseconds.
    pub latency_ms: u64,
}

/// Inputs required to construct an [`ApiAuditEvent`].
pub struct ApiAuditEventParams {
    /// Request identifier, assigned per request.
    pub request_id: String,
    /// HTTP method.
    pub method: String,
    /// Request path (route template, not the raw URI).
    pub route: String,
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Response status code.
    pub status: u16,
    /// Error kind label, present on non-2xx responses.
    pub error_kind: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Wall-clock handler latency in milliseconds.
    pub latency_ms: u64,
}

impl ApiAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiAuditEventParams) -> Self {
        let timestamp_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "api_request",
            timestamp_ms,
            request_id: params.request_id,
            method: params.method,
            route: params.route,
            peer_ip: params.peer_ip,
            status: params.status,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            latency_ms: params.latency_ms,
        }
    }
}

// ============================================================================
// SECTION: Sink Trait and Implementations
// ============================================================================

/// Audit sink for REST/SSE request events.
pub trait ApiAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &ApiAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct ApiStderrAuditSink;

impl ApiAuditSink for ApiStderrAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to an append-only file.
pub struct ApiFileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl ApiFileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl ApiAuditSink for ApiFileAuditSink {
    fn record(&self, event: &ApiAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct ApiNoopAuditSink;

impl ApiAuditSink for ApiNoopAuditSink {
    fn record(&self, _event: &ApiAuditEvent) {}
}
