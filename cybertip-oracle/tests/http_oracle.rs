// cybertip-oracle/tests/http_oracle.rs
// ============================================================================
// Test: HTTP Oracle Transport
// Description: Exercises HttpOracle against a local tiny_http backend.
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Read;
use std::net::TcpListener;
use std::thread;

use cybertip_core::interfaces::AgentRequest;
use cybertip_core::interfaces::Oracle;
use cybertip_core::interfaces::OracleError;
use cybertip_core::interfaces::RoleBand;
use cybertip_oracle::HttpOracle;
use cybertip_oracle::HttpOracleConfig;
use tiny_http::Response;
use tiny_http::Server;

/// Binds a `tiny_http` server on an ephemeral local port.
fn spawn_backend() -> (Server, std::net::SocketAddr) {
    let server = Server::http("127.0.0.1:0").expect("bind backend");
    let addr = server.server_addr().to_ip().expect("ip addr");
    (server, addr)
}

/// Builds a sample classifier-stage request over `user_text`.
fn sample_request(user_text: &str) -> AgentRequest<'_> {
    AgentRequest {
        stage_name: "classifier",
        role: RoleBand::High,
        system_text: "classify the tip",
        user_text,
        tools: None,
        execute_tool_call: None,
        max_tokens: 256,
        max_iterations: 3,
        timeout_ms: 2_000,
    }
}

#[test]
fn returns_text_response_from_backend() {
    let (server, addr) = spawn_backend();
    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("recv");
        let mut body = String::new();
        request.as_reader().read_to_string(&mut body).expect("read body");
        assert!(body.contains("classify the tip"));
        let response = Response::from_string(r#"{"type":"text","text":"{\"tier\":\"Urgent\"}"}"#)
            .with_header("Content-Type: application/json".parse::<tiny_http::Header>().expect("header"));
        request.respond(response).expect("respond");
    });

    let oracle = HttpOracle::new(HttpOracleConfig {
        endpoint: format!("http://{addr}/v1/agent"),
        ..HttpOracleConfig::default()
    })
    .expect("new oracle");
    let text = oracle.run_agent(&sample_request("a clean tip body")).expect("run_agent");
    assert_eq!(text, r#"{"tier":"Urgent"}"#);
    handle.join().expect("join");
}

#[test]
fn drives_a_tool_call_loop_before_returning_text() {
    let (server, addr) = spawn_backend();
    let handle = thread::spawn(move || {
        let mut first = server.recv().expect("recv first");
        let mut body = String::new();
        first.as_reader().read_to_string(&mut body).expect("read body");
        first
            .respond(Response::from_string(
                r#"{"type":"tool_call","name":"lookup_hash","arguments":{"sha256":"abc"}}"#,
            ))
            .expect("respond first");

        let mut second = server.recv().expect("recv second");
        let mut second_body = String::new();
        second.as_reader().read_to_string(&mut second_body).expect("read body");
        assert!(second_body.contains("tool_call:lookup_hash"));
        second
            .respond(Response::from_string(r#"{"type":"text","text":"{\"tier\":\"Monitor\"}"}"#))
            .expect("respond second");
    });

    let oracle = HttpOracle::new(HttpOracleConfig {
        endpoint: format!("http://{addr}/v1/agent"),
        ..HttpOracleConfig::default()
    })
    .expect("new oracle");

    let executor = |name: &str, _arguments: &serde_json::Value| -> Result<serde_json::Value, OracleError> {
        assert_eq!(name, "lookup_hash");
        Ok(serde_json::json!({"match": false}))
    };
    let mut request = sample_request("a clean tip body");
    request.execute_tool_call = Some(&executor);

    let text = oracle.run_agent(&request).expect("run_agent");
    assert_eq!(text, r#"{"tier":"Monitor"}"#);
    handle.join().expect("join");
}

#[test]
fn maps_connection_refused_to_unreachable() {
    // Bind then immediately drop the listener to get a port nothing answers on.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);

    let oracle = HttpOracle::new(HttpOracleConfig {
        endpoint: format!("http://{addr}/v1/agent"),
        ..HttpOracleConfig::default()
    })
    .expect("new oracle");
    let error = oracle.run_agent(&sample_request("tip body")).expect_err("expected failure");
    assert!(matches!(error, OracleError::Unreachable(_)));
}

#[test]
fn missing_executor_for_tool_call_is_tool_execution_error() {
    let (server, addr) = spawn_backend();
    let handle = thread::spawn(move || {
        let request = server.recv().expect("recv");
        request
            .respond(Response::from_string(
                r#"{"type":"tool_call","name":"lookup_hash","arguments":{}}"#,
            ))
            .expect("respond");
    });

    let oracle = HttpOracle::new(HttpOracleConfig {
        endpoint: format!("http://{addr}/v1/agent"),
        ..HttpOracleConfig::default()
    })
    .expect("new oracle");
    let error = oracle.run_agent(&sample_request("tip body")).expect_err("expected failure");
    assert!(matches!(error, OracleError::ToolExecution(_)));
    handle.join().expect("join");
}
