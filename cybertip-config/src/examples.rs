// cybertip-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example environment configuration.
// Purpose: Deterministic examples for docs and operator onboarding.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A canonical `.env` example kept in sync with [`crate::docs`].

/// Returns a canonical example environment file for a memory-backed,
/// stub-tool deployment suitable for local development.
#[must_use]
pub fn env_example() -> String {
    String::from(
        "DB_MODE=memory\n\
         QUEUE_MODE=memory\n\
         TOOL_MODE=stub\n\
         DEMO_MODE=false\n\
         NODE_ENV=development\n\
         OFFLINE_MODE=false\n\
         SERVER_BIND=127.0.0.1:8080\n\
         SERVER_MAX_BODY_BYTES=8388608\n\
         SERVER_MAX_INFLIGHT=256\n\
         SERVER_RATE_LIMIT_ENABLED=false\n",
    )
}

#[cfg(test)]
mod tests {
    #[test]
    fn example_sets_every_required_variable() {
        let example = super::env_example();
        for var in ["DB_MODE", "QUEUE_MODE", "TOOL_MODE", "DEMO_MODE", "NODE_ENV", "OFFLINE_MODE"] {
            assert!(example.contains(var), "missing {var} in example");
        }
    }
}
