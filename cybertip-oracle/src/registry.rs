// cybertip-oracle/src/registry.rs
// ============================================================================
// Module: Oracle Role-Band Registry
// Description: Routes agent invocations to a backend by role band.
// Purpose: Let fast and high role bands point at independent backends.
// Dependencies: cybertip-core
// ============================================================================

//! ## Overview
//! The Agent Harness never talks to a backend directly: it talks to an
//! [`OracleRegistry`], which holds one [`Oracle`] implementation per
//! [`RoleBand`] and dispatches each request to the backend configured for
//! its declared role. This lets `fast` invocations run against a cheaper
//! model while `high` invocations, mandatory for the Wilson Gate and
//! Classifier stages, run against a stronger one.

use cybertip_core::interfaces::AgentRequest;
use cybertip_core::interfaces::Oracle;
use cybertip_core::interfaces::OracleError;
use cybertip_core::interfaces::RoleBand;

/// Registry of oracle backends keyed by role band.
pub struct OracleRegistry {
    /// Backend used for `RoleBand::Fast` invocations.
    fast: Box<dyn Oracle + Send + Sync>,
    /// Backend used for `RoleBand::High` invocations.
    high: Box<dyn Oracle + Send + Sync>,
}

impl OracleRegistry {
    /// Creates a registry from explicit fast and high backends.
    #[must_use]
    pub fn new(
        fast: impl Oracle + Send + Sync + 'static,
        high: impl Oracle + Send + Sync + 'static,
    ) -> Self {
        Self { fast: Box::new(fast), high: Box::new(high) }
    }

    /// Returns the backend configured for `role`.
    const fn backend_for(&self, role: RoleBand) -> &(dyn Oracle + Send + Sync) {
        match role {
            RoleBand::Fast => self.fast.as_ref(),
            RoleBand::High => self.high.as_ref(),
        }
    }
}

impl Oracle for OracleRegistry {
    fn run_agent(&self, request: &AgentRequest<'_>) -> Result<String, OracleError> {
        self.backend_for(request.role).run_agent(request)
    }
}
