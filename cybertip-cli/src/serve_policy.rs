// cybertip-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure policy checks for the CLI server launcher.
// Purpose: Enforce safe-by-default bind behavior with explicit opt-in.
// Dependencies: cybertip-config, std
// ============================================================================

//! ## Overview
//! Provides safety checks for binding the API server to non-loopback
//! addresses. The policy is fail-closed: explicit opt-in is required before
//! a bind outside of loopback is allowed, since the API surface carries no
//! authentication of its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::net::SocketAddr;

use cybertip_config::ServerConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable enabling non-loopback server binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "CYBERTIP_ALLOW_NON_LOOPBACK";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bind outcome metadata for transport warnings.
///
/// # Invariants
/// - `network_exposed` is `true` only when a non-loopback bind is selected.
#[derive(Debug, Clone)]
pub struct BindOutcome {
    /// Bound socket address.
    pub bind_addr: SocketAddr,
    /// True when the server is bound to a non-loopback address.
    pub network_exposed: bool,
    /// Whether rate limiting is enabled for the bind.
    pub rate_limit_enabled: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Serve policy failures for bind safety.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// Bind string failed to parse.
    InvalidBind {
        /// Raw bind value.
        bind: String,
        /// Parse error message.
        error: String,
    },
    /// Non-loopback binding requires explicit opt-in.
    NonLoopbackOptInRequired {
        /// Bind address.
        bind: String,
    },
    /// Non-loopback binding without a rate limit configured is refused.
    NonLoopbackRateLimitRequired {
        /// Bind address.
        bind: String,
    },
}

impl std::fmt::Display for ServePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEnv { value } => {
                write!(f, "invalid value for {ALLOW_NON_LOOPBACK_ENV}: {value}")
            }
            Self::InvalidBind { bind, error } => {
                write!(f, "failed to parse bind address {bind}: {error}")
            }
            Self::NonLoopbackOptInRequired { bind } => {
                write!(f, "bind {bind} is not loopback; set {ALLOW_NON_LOOPBACK_ENV}=true to allow it")
            }
            Self::NonLoopbackRateLimitRequired { bind } => {
                write!(f, "bind {bind} is not loopback and requires a rate limit; set SERVER_RATE_LIMIT_ENABLED=true")
            }
        }
    }
}

impl std::error::Error for ServePolicyError {}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Resolves the non-loopback opt-in flag from the CLI flag and environment.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    let value = value.to_string_lossy().to_string();
    parse_allow_non_loopback_value(&value)
}

/// Enforces local-only bind restrictions for the API server.
///
/// # Errors
/// Returns [`ServePolicyError`] when configuration violates security requirements.
pub fn enforce_local_only(config: &ServerConfig, allow_non_loopback: bool) -> Result<BindOutcome, ServePolicyError> {
    let rate_limit_enabled = config.limits.rate_limit.is_some();
    let addr: SocketAddr = config.bind.parse().map_err(|err: std::net::AddrParseError| ServePolicyError::InvalidBind {
        bind: config.bind.clone(),
        error: err.to_string(),
    })?;

    if addr.ip().is_loopback() {
        return Ok(BindOutcome { bind_addr: addr, network_exposed: false, rate_limit_enabled });
    }

    if !allow_non_loopback {
        return Err(ServePolicyError::NonLoopbackOptInRequired { bind: config.bind.clone() });
    }
    if !rate_limit_enabled {
        return Err(ServePolicyError::NonLoopbackRateLimitRequired { bind: config.bind.clone() });
    }

    Ok(BindOutcome { bind_addr: addr, network_exposed: true, rate_limit_enabled })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a bool-ish string (true/false/1/0/yes/no/on/off).
fn parse_boolish(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parses an env value for allow-non-loopback.
pub(crate) fn parse_allow_non_loopback_value(value: &str) -> Result<bool, ServePolicyError> {
    parse_boolish(value).map_or_else(|| Err(ServePolicyError::InvalidEnv { value: value.to_string() }), Ok)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
