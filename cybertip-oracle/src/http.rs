// cybertip-oracle/src/http.rs
// ============================================================================
// Module: HTTP Oracle Transport
// Description: Single-attempt HTTP transport to an LLM agent backend.
// Purpose: Implement the Oracle contract over a bounded, non-redirecting
//          HTTP POST, including the bounded tool-call loop.
// Dependencies: cybertip-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! `HttpOracle` is a single-attempt [`Oracle`] implementation: it makes no
//! retry decisions of its own (that is [`crate::retry::run_with_retry`]'s
//! job, applied by the harness around a whole invocation) but it does drive
//! the bounded tool-call loop a single invocation may require, since that
//! loop is a property of one conversation with the backend, not of retrying
//! a failed attempt.

use std::time::Duration;

use cybertip_core::interfaces::AgentRequest;
use cybertip_core::interfaces::Oracle;
use cybertip_core::interfaces::OracleError;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Configuration for an [`HttpOracle`] backing a single role band.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpOracleConfig {
    /// Base URL of the agent backend's chat-completion endpoint.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum response size accepted, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpOracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8081/v1/agent".to_string(),
            model: "cybertip-triage".to_string(),
            max_response_bytes: 1024 * 1024,
            user_agent: "cybertip-oracle/0.1".to_string(),
        }
    }
}

/// HTTP-backed [`Oracle`] implementation for one role band.
pub struct HttpOracle {
    /// Backend configuration.
    config: HttpOracleConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpOracle {
    /// Creates a new HTTP oracle transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Unreachable`] when the HTTP client cannot be
    /// constructed (invalid TLS configuration, for example).
    pub fn new(config: HttpOracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|error| OracleError::Unreachable(error.to_string()))?;
        Ok(Self { config, client })
    }

    /// Sends one chat-completion request and parses the response.
    fn send_once(
        &self,
        payload: &ChatRequestWire<'_>,
        timeout_ms: u64,
    ) -> Result<ChatResponseWire, OracleError> {
        let url = Url::parse(&self.config.endpoint)
            .map_err(|error| OracleError::Unreachable(error.to_string()))?;
        let response = self
            .client
            .post(url)
            .timeout(Duration::from_millis(timeout_ms))
            .json(payload)
            .send()
            .map_err(|error| {
                if error.is_timeout() {
                    OracleError::Timeout(timeout_ms)
                } else {
                    OracleError::Unreachable(error.to_string())
                }
            })?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(OracleError::InvalidResponse(format!("backend returned status {status}")));
        }
        let content_length = response.content_length();
        let max_bytes = u64::try_from(self.config.max_response_bytes).unwrap_or(u64::MAX);
        if let Some(length) = content_length
            && length > max_bytes
        {
            return Err(OracleError::InvalidResponse("response exceeds size limit".to_string()));
        }
        response.json::<ChatResponseWire>().map_err(|error| OracleError::InvalidResponse(error.to_string()))
    }
}

impl Oracle for HttpOracle {
    fn run_agent(&self, request: &AgentRequest<'_>) -> Result<String, OracleError> {
        let tools_wire: Vec<ToolSpecWire<'_>> = request
            .tools
            .unwrap_or(&[])
            .iter()
            .map(|tool| ToolSpecWire {
                name: &tool.name,
                description: &tool.description,
                parameters: &tool.parameters,
            })
            .collect();
        let mut messages = vec![ChatMessageWire { role: "user", content: request.user_text.to_string() }];

        let iterations = request.max_iterations.max(1);
        for _ in 0..iterations {
            let payload = ChatRequestWire {
                model: &self.config.model,
                system: request.system_text,
                messages: messages.clone(),
                tools: tools_wire.clone(),
                max_tokens: request.max_tokens,
            };
            match self.send_once(&payload, request.timeout_ms)? {
                ChatResponseWire::Text { text } => return Ok(text),
                ChatResponseWire::ToolCall { name, arguments } => {
                    let executor = request.execute_tool_call.ok_or_else(|| {
                        OracleError::ToolExecution(format!(
                            "backend requested tool \"{name}\" but no executor was provided"
                        ))
                    })?;
                    let result = executor(&name, &arguments)?;
                    messages.push(ChatMessageWire {
                        role: "assistant",
                        content: format!("tool_call:{name}:{arguments}"),
                    });
                    messages.push(ChatMessageWire { role: "tool", content: result.to_string() });
                }
            }
        }
        Err(OracleError::InvalidResponse(
            "backend did not return a final text response within max_iterations".to_string(),
        ))
    }
}

/// Wire request body sent to the agent backend.
#[derive(Debug, Serialize)]
struct ChatRequestWire<'a> {
    /// Model identifier, from [`HttpOracleConfig::model`].
    model: &'a str,
    /// System prompt text, trusted and not sentinel-wrapped.
    system: &'a str,
    /// Conversation turns so far, user text first.
    messages: Vec<ChatMessageWire>,
    /// Tools offered to the model for this request.
    tools: Vec<ToolSpecWire<'a>>,
    /// Maximum tokens in the response.
    max_tokens: u32,
}

/// Wire representation of a single conversation turn.
#[derive(Debug, Clone, Serialize)]
struct ChatMessageWire {
    /// Turn role: `"user"`, `"assistant"`, or `"tool"`.
    role: &'static str,
    /// Turn content.
    content: String,
}

/// Wire representation of a callable tool offered to the backend.
#[derive(Debug, Clone, Serialize)]
struct ToolSpecWire<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

/// Wire response from the agent backend: either a final answer or a
/// request to invoke a tool before continuing.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ChatResponseWire {
    /// The backend produced a final text response.
    Text {
        /// Raw text, to be run through JSON extraction by the caller.
        text: String,
    },
    /// The backend requests a tool call before it can continue.
    ToolCall {
        /// Name of the tool to invoke, matching a supplied [`ToolSpecWire`].
        name: String,
        /// Arguments to pass to the tool.
        arguments: Value,
    },
}
