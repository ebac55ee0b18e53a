// cybertip-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for the CyberTip environment surface.
// Purpose: Keep operator-facing env var docs in sync with the config model.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Generates `Docs/configuration/environment.md` from the canonical list of
//! environment variables. This output is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "Docs/configuration/environment.md";

/// One row of the environment variable reference table.
struct EnvVarDoc {
    /// Variable name.
    name: &'static str,
    /// Accepted values or value shape.
    values: &'static str,
    /// Default when unset.
    default: &'static str,
    /// One-line description.
    description: &'static str,
}

/// The full set of environment variables documented for operators.
const ENV_VARS: &[EnvVarDoc] = &[
    EnvVarDoc {
        name: "DB_MODE",
        values: "memory | postgres",
        default: "memory",
        description: "Durable-store backend; postgres resolves to the SQLite backend behind the same contract.",
    },
    EnvVarDoc {
        name: "DB_SQLITE_PATH",
        values: "path",
        default: "(unset)",
        description: "SQLite database path, required when DB_MODE=postgres.",
    },
    EnvVarDoc {
        name: "QUEUE_MODE",
        values: "memory | durable",
        default: "memory",
        description: "Ingestion queue backend.",
    },
    EnvVarDoc {
        name: "TOOL_MODE",
        values: "stub | real",
        default: "stub",
        description: "Oracle/tool invocation mode.",
    },
    EnvVarDoc {
        name: "DEMO_MODE",
        values: "bool",
        default: "false",
        description: "Instant-bypass demo mode; never enabled implicitly.",
    },
    EnvVarDoc {
        name: "NODE_ENV",
        values: "development | test | production",
        default: "development",
        description: "Deployment environment label.",
    },
    EnvVarDoc {
        name: "OFFLINE_MODE",
        values: "bool",
        default: "false",
        description: "Use an offline hash database instead of a live OSINT lookup.",
    },
    EnvVarDoc {
        name: "OFFLINE_HASH_DB_PATH",
        values: "path",
        default: "(unset)",
        description: "Offline hash database path, required when OFFLINE_MODE=true.",
    },
    EnvVarDoc {
        name: "SERVER_BIND",
        values: "socket address",
        default: "127.0.0.1:8080",
        description: "Bind address for the HTTP/SSE listener.",
    },
    EnvVarDoc {
        name: "SERVER_MAX_BODY_BYTES",
        values: "integer",
        default: "8388608",
        description: "Maximum request body size in bytes.",
    },
    EnvVarDoc {
        name: "SERVER_MAX_INFLIGHT",
        values: "integer",
        default: "256",
        description: "Maximum inflight requests.",
    },
    EnvVarDoc {
        name: "SERVER_RATE_LIMIT_ENABLED",
        values: "bool",
        default: "false",
        description: "Enable the server's request rate limiter.",
    },
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the configuration markdown documentation.
#[must_use]
pub fn config_docs_markdown() -> String {
    let mut out = String::new();
    out.push_str("<!-- This file is auto-generated; do not edit manually. -->\n\n");
    out.push_str("# Environment Configuration\n\n");
    out.push_str(
        "CyberTip is configured entirely from environment variables. Missing or \
         invalid values fail closed.\n\n",
    );
    out.push_str("| Variable | Values | Default | Description |\n");
    out.push_str("|---|---|---|---|\n");
    for var in ENV_VARS {
        out.push_str(&format!("| `{}` | {} | `{}` | {} |\n", var.name, var.values, var.default, var.description));
    }
    out
}

/// Writes the generated docs to `path`, or the default docs path if `None`.
///
/// # Errors
///
/// Returns [`DocsError`] when the file cannot be written.
pub fn write_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(path, config_docs_markdown()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies that the committed docs file matches the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the file is missing, unreadable, or stale.
pub fn verify_config_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let on_disk = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    let generated = config_docs_markdown();
    if on_disk != generated {
        return Err(DocsError::Drift(format!("{} is out of date; regenerate it", path.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only framing assertions."
    )]

    use tempfile::NamedTempFile;

    use super::config_docs_markdown;
    use super::verify_config_docs;
    use super::write_config_docs;

    #[test]
    fn docs_list_every_documented_variable() {
        let docs = config_docs_markdown();
        assert!(docs.contains("DB_MODE"));
        assert!(docs.contains("OFFLINE_HASH_DB_PATH"));
    }

    #[test]
    fn write_then_verify_round_trips() {
        let file = NamedTempFile::new().expect("tempfile");
        write_config_docs(Some(file.path())).expect("write docs");
        verify_config_docs(Some(file.path())).expect("verify docs");
    }
}
