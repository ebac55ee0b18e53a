// cybertip-api/src/dispatch.rs
// ============================================================================
// Module: Preservation Letter Dispatch
// Description: Dispatcher implementations for preservation-letter delivery.
// Purpose: Satisfy the Orchestrator's Dispatcher contract without a live
//          SMTP/ESP-portal integration, which is contract-only in scope.
// Dependencies: cybertip-core
// ============================================================================

//! ## Overview
//! [`LoggingDispatcher`] records every preservation letter it would have
//! sent through an [`ApiAuditSink`] instead of performing real delivery.
//! Real ESP/SMTP adapters are out of scope; this keeps the Orchestrator's
//! `D: Dispatcher` contract satisfied end to end.

use cybertip_core::DispatchError;
use cybertip_core::Dispatcher;
use cybertip_core::PreservationRequest;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::ApiAuditSink;

/// Dispatcher that logs preservation letters instead of delivering them.
pub struct LoggingDispatcher<A: ApiAuditSink> {
    audit: A,
}

impl<A: ApiAuditSink> LoggingDispatcher<A> {
    /// Creates a new logging dispatcher backed by the given audit sink.
    pub const fn new(audit: A) -> Self {
        Self { audit }
    }
}

impl<A: ApiAuditSink> Dispatcher for LoggingDispatcher<A> {
    fn send_preservation_letter(&self, request: &PreservationRequest) -> Result<(), DispatchError> {
        self.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            request_id: request.request_id.as_str().to_owned(),
            method: "DISPATCH".to_owned(),
            route: "/preservation/letter".to_owned(),
            peer_ip: None,
            status: 0,
            error_kind: None,
            request_bytes: request.letter.as_ref().map_or(0, String::len),
            response_bytes: 0,
            latency_ms: 0,
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only framing assertions.")]

    use time::macros::datetime;

    use super::Dispatcher;
    use super::LoggingDispatcher;
    use crate::audit::ApiNoopAuditSink;
    use cybertip_core::JurisdictionLabel;
    use cybertip_core::PreservationRequest;
    use cybertip_core::PreservationStatus;
    use cybertip_core::RequestId;
    use cybertip_core::TipId;
    use cybertip_core::Timestamp;

    fn sample_request() -> PreservationRequest {
        PreservationRequest {
            request_id: RequestId::new("req-1"),
            tip_id: TipId::new("tip-1"),
            esp_name: "Example Platform".to_owned(),
            account_identifiers: vec!["user123".to_owned()],
            legal_basis: "18 U.S.C. 2703(f)".to_owned(),
            jurisdiction: JurisdictionLabel::UsFederal,
            deadline: Timestamp::from_offset(datetime!(2026-04-15 0:00 UTC)),
            status: PreservationStatus::Draft,
            auto_generated: true,
            letter: Some("Dear custodian...".to_owned()),
            approver: None,
        }
    }

    #[test]
    fn dispatch_never_fails() {
        let dispatcher = LoggingDispatcher::new(ApiNoopAuditSink);
        dispatcher.send_preservation_letter(&sample_request()).expect("logging dispatch always succeeds");
    }
}
