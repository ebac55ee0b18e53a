// cybertip-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema for the CyberTip environment surface.
// Purpose: Provide a machine-readable validation schema for tooling.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Describes the resolved [`crate::config::CyberTipConfig`] shape as JSON
//! Schema, for tooling that wants to validate a serialized snapshot (e.g.
//! `cybertip config show --json`) without depending on this crate directly.

use serde_json::Value;
use serde_json::json;

use crate::config::MAX_RATE_LIMIT_REQUESTS;
use crate::config::MAX_RATE_LIMIT_WINDOW_MS;
use crate::config::MIN_RATE_LIMIT_WINDOW_MS;

/// Returns the JSON Schema describing a resolved [`crate::config::CyberTipConfig`].
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "CyberTipConfig",
        "type": "object",
        "required": ["db", "queue", "tool_mode", "demo_mode", "node_env", "offline", "server"],
        "properties": {
            "db": {
                "type": "object",
                "required": ["mode"],
                "properties": {
                    "mode": { "enum": ["memory", "postgres"] },
                    "sqlite_path": { "type": ["string", "null"] }
                }
            },
            "queue": {
                "type": "object",
                "required": ["mode"],
                "properties": {
                    "mode": { "enum": ["memory", "durable"] }
                }
            },
            "tool_mode": { "enum": ["stub", "real"] },
            "demo_mode": { "type": "boolean" },
            "node_env": { "enum": ["development", "test", "production"] },
            "offline": {
                "type": "object",
                "required": ["enabled"],
                "properties": {
                    "enabled": { "type": "boolean" },
                    "hash_db_path": { "type": ["string", "null"] }
                }
            },
            "server": {
                "type": "object",
                "required": ["bind", "max_body_bytes", "limits"],
                "properties": {
                    "bind": { "type": "string" },
                    "max_body_bytes": { "type": "integer", "minimum": 1 },
                    "limits": {
                        "type": "object",
                        "required": ["max_inflight"],
                        "properties": {
                            "max_inflight": { "type": "integer", "minimum": 1 },
                            "rate_limit": {
                                "type": ["object", "null"],
                                "properties": {
                                    "max_requests": {
                                        "type": "integer",
                                        "minimum": 1,
                                        "maximum": MAX_RATE_LIMIT_REQUESTS
                                    },
                                    "window_ms": {
                                        "type": "integer",
                                        "minimum": MIN_RATE_LIMIT_WINDOW_MS,
                                        "maximum": MAX_RATE_LIMIT_WINDOW_MS
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}
