// cybertip-config/src/config.rs
// ============================================================================
// Module: CyberTip Configuration
// Description: Environment-driven configuration model and validation.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: cybertip-core, serde, thiserror
// ============================================================================

//! ## Overview
//! Configuration is sourced entirely from environment variables, not a config
//! file: `DB_MODE`, `QUEUE_MODE`, `TOOL_MODE`, `DEMO_MODE`, `NODE_ENV`,
//! `OFFLINE_MODE`/`OFFLINE_HASH_DB_PATH`, plus the server bind/limits knobs.
//! Missing or invalid configuration fails closed; a bad value is an error,
//! never a silent fallback to a permissive default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bind address when `SERVER_BIND` is unset.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default maximum request body size in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024 * 8;
/// Default maximum inflight requests.
const DEFAULT_MAX_INFLIGHT: usize = 256;
/// Minimum allowed rate limit window in milliseconds.
pub const MIN_RATE_LIMIT_WINDOW_MS: u64 = 100;
/// Maximum allowed rate limit window in milliseconds.
pub const MAX_RATE_LIMIT_WINDOW_MS: u64 = 60_000;
/// Maximum allowed requests per rate limit window.
pub const MAX_RATE_LIMIT_REQUESTS: u32 = 100_000;
/// Default max requests per window when rate limiting is enabled.
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 1_000;
/// Default rate limit window in milliseconds when enabled.
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 1_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {message}")]
    EnvVar {
        /// The offending environment variable name.
        var: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },
    /// The configuration was internally inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Top-Level Configuration
// ============================================================================

/// Fully resolved CyberTip runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CyberTipConfig {
    /// Durable-store backend selection.
    pub db: DbConfig,
    /// Ingestion queue backend selection.
    pub queue: QueueConfig,
    /// Oracle/tool invocation mode.
    pub tool_mode: ToolMode,
    /// Instant-bypass demo mode. Never enabled implicitly.
    pub demo_mode: bool,
    /// Deployment environment label.
    pub node_env: NodeEnv,
    /// Offline hash-database configuration for hash/OSINT enrichment.
    pub offline: OfflineConfig,
    /// HTTP/SSE server configuration.
    pub server: ServerConfig,
}

impl CyberTipConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment variable is present but
    /// cannot be parsed, or validation fails.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            db: DbConfig::from_env()?,
            queue: QueueConfig::from_env()?,
            tool_mode: ToolMode::from_env()?,
            demo_mode: env_bool("DEMO_MODE", false)?,
            node_env: NodeEnv::from_env()?,
            offline: OfflineConfig::from_env()?,
            server: ServerConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.db.validate()?;
        self.offline.validate()?;
        self.server.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Db / Queue / Tool Mode
// ============================================================================

/// Durable-store backend selection for `DB_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DbModeKind {
    /// In-process ordered map, cleared on restart.
    #[default]
    Memory,
    /// Durable relational backend (`SQLite`, behind the same contract a
    /// Postgres deployment would present).
    Postgres,
}

/// Resolved durable-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Backend selection.
    pub mode: DbModeKind,
    /// `SQLite` database path, required when `mode = postgres`.
    pub sqlite_path: Option<PathBuf>,
}

impl DbConfig {
    /// Reads durable-store configuration from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        let mode = match env_str("DB_MODE").as_deref() {
            None | Some("memory") => DbModeKind::Memory,
            Some("postgres") => DbModeKind::Postgres,
            Some(other) => {
                return Err(ConfigError::EnvVar {
                    var: "DB_MODE",
                    message: format!("expected memory or postgres, got {other}"),
                });
            }
        };
        let sqlite_path = env_str("DB_SQLITE_PATH").map(PathBuf::from);
        Ok(Self { mode, sqlite_path })
    }

    /// Validates durable-store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            DbModeKind::Memory => Ok(()),
            DbModeKind::Postgres => {
                if self.sqlite_path.is_none() {
                    return Err(ConfigError::Invalid(
                        "DB_MODE=postgres requires DB_SQLITE_PATH".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Ingestion queue backend selection for `QUEUE_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueModeKind {
    /// In-process queue, cleared on restart.
    #[default]
    Memory,
    /// Durable queue backed by the same store as `db`.
    Durable,
}

/// Resolved ingestion queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Backend selection.
    pub mode: QueueModeKind,
}

impl QueueConfig {
    /// Reads queue configuration from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        let mode = match env_str("QUEUE_MODE").as_deref() {
            None | Some("memory") => QueueModeKind::Memory,
            Some("durable") => QueueModeKind::Durable,
            Some(other) => {
                return Err(ConfigError::EnvVar {
                    var: "QUEUE_MODE",
                    message: format!("expected memory or durable, got {other}"),
                });
            }
        };
        Ok(Self { mode })
    }
}

/// Oracle/tool invocation mode for `TOOL_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    /// Deterministic canned responses, no outbound calls.
    #[default]
    Stub,
    /// Real oracle/tool invocation.
    Real,
}

impl ToolMode {
    /// Reads tool mode from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        match env_str("TOOL_MODE").as_deref() {
            None | Some("stub") => Ok(Self::Stub),
            Some("real") => Ok(Self::Real),
            Some(other) => Err(ConfigError::EnvVar {
                var: "TOOL_MODE",
                message: format!("expected stub or real, got {other}"),
            }),
        }
    }
}

/// Deployment environment label for `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeEnv {
    /// Local development.
    #[default]
    Development,
    /// Automated test runs.
    Test,
    /// Live deployment.
    Production,
}

impl NodeEnv {
    /// Reads the deployment environment label from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        match env_str("NODE_ENV").as_deref() {
            None | Some("development") => Ok(Self::Development),
            Some("test") => Ok(Self::Test),
            Some("production") => Ok(Self::Production),
            Some(other) => Err(ConfigError::EnvVar {
                var: "NODE_ENV",
                message: format!("expected development, test, or production, got {other}"),
            }),
        }
    }
}

// ============================================================================
// SECTION: Offline Hash Database
// ============================================================================

/// Offline hash-database configuration for the hash/OSINT enrichment stage.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OfflineConfig {
    /// Enable offline hash matching instead of a live OSINT lookup.
    pub enabled: bool,
    /// Path to the offline hash database, required when `enabled`.
    pub hash_db_path: Option<PathBuf>,
}

impl OfflineConfig {
    /// Reads offline configuration from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = env_bool("OFFLINE_MODE", false)?;
        let hash_db_path = env_str("OFFLINE_HASH_DB_PATH").map(PathBuf::from);
        Ok(Self { enabled, hash_db_path })
    }

    /// Validates offline configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.hash_db_path.is_none() {
            return Err(ConfigError::Invalid(
                "OFFLINE_MODE=true requires OFFLINE_HASH_DB_PATH".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// HTTP/SSE server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP/SSE listener.
    pub bind: String,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Request limits (concurrency/rate).
    pub limits: ServerLimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            limits: ServerLimitsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads server configuration from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        let bind = env_str("SERVER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let max_body_bytes = env_usize("SERVER_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;
        Ok(Self { bind, max_body_bytes, limits: ServerLimitsConfig::from_env()? })
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let _: SocketAddr = self.bind.parse().map_err(|_| {
            ConfigError::Invalid(format!("SERVER_BIND is not a valid socket address: {}", self.bind))
        })?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "SERVER_MAX_BODY_BYTES must be greater than zero".to_string(),
            ));
        }
        self.limits.validate()
    }
}

/// Request limits for the HTTP/SSE server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerLimitsConfig {
    /// Maximum inflight requests.
    pub max_inflight: usize,
    /// Optional rate limit configuration.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ServerLimitsConfig {
    fn default() -> Self {
        Self { max_inflight: DEFAULT_MAX_INFLIGHT, rate_limit: None }
    }
}

impl ServerLimitsConfig {
    /// Reads server limits configuration from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        let max_inflight = env_usize("SERVER_MAX_INFLIGHT", DEFAULT_MAX_INFLIGHT)?;
        let rate_limit =
            if env_bool("SERVER_RATE_LIMIT_ENABLED", false)? { Some(RateLimitConfig::from_env()?) } else { None };
        Ok(Self { max_inflight, rate_limit })
    }

    /// Validates request limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_inflight == 0 {
            return Err(ConfigError::Invalid(
                "SERVER_MAX_INFLIGHT must be greater than zero".to_string(),
            ));
        }
        if let Some(rate_limit) = &self.rate_limit {
            rate_limit.validate()?;
        }
        Ok(())
    }
}

/// Rate limit configuration for the HTTP/SSE server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests per time window.
    pub max_requests: u32,
    /// Window duration in milliseconds.
    pub window_ms: u64,
}

impl RateLimitConfig {
    /// Reads rate limit configuration from the environment.
    fn from_env() -> Result<Self, ConfigError> {
        let max_requests =
            env_u32("SERVER_RATE_LIMIT_MAX_REQUESTS", DEFAULT_RATE_LIMIT_MAX_REQUESTS)?;
        let window_ms = env_u64("SERVER_RATE_LIMIT_WINDOW_MS", DEFAULT_RATE_LIMIT_WINDOW_MS)?;
        Ok(Self { max_requests, window_ms })
    }

    /// Validates rate limit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_requests == 0 || self.max_requests > MAX_RATE_LIMIT_REQUESTS {
            return Err(ConfigError::Invalid(
                "SERVER_RATE_LIMIT_MAX_REQUESTS out of range".to_string(),
            ));
        }
        if self.window_ms < MIN_RATE_LIMIT_WINDOW_MS || self.window_ms > MAX_RATE_LIMIT_WINDOW_MS {
            return Err(ConfigError::Invalid(format!(
                "SERVER_RATE_LIMIT_WINDOW_MS must be between {MIN_RATE_LIMIT_WINDOW_MS} and \
                 {MAX_RATE_LIMIT_WINDOW_MS}",
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Environment Helpers
// ============================================================================

/// Reads an environment variable as a trimmed string, `None` if unset or empty.
fn env_str(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Reads a boolean environment variable, defaulting when unset.
fn env_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env_str(name).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => {
            Err(ConfigError::EnvVar { var: name, message: format!("expected a boolean, got {other}") })
        }
    }
}

/// Reads a `usize` environment variable, defaulting when unset.
fn env_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env_str(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::EnvVar { var: name, message: format!("expected an integer, got {value}") }),
    }
}

/// Reads a `u32` environment variable, defaulting when unset.
fn env_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env_str(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::EnvVar { var: name, message: format!("expected an integer, got {value}") }),
    }
}

/// Reads a `u64` environment variable, defaulting when unset.
fn env_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env_str(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::EnvVar { var: name, message: format!("expected an integer, got {value}") }),
    }
}
