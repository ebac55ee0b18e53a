// cybertip-api/src/server.rs
// ============================================================================
// Module: HTTP/SSE Surface
// Description: Axum router and handlers exposing the triage pipeline.
// Purpose: Serve tip queue/detail/assignment/warrant/preservation/legal
//          operations and a per-tip SSE stage-event stream.
// Dependencies: axum, tokio, tokio-stream, cybertip-core, cybertip-config,
//               cybertip-oracle, cybertip-store-sqlite, cybertip-ingest
// ============================================================================

//! ## Overview
//! [`ApiServer`] builds an [`Orchestrator`] over a configured repository,
//! oracle, and dispatcher, then exposes it as an axum [`Router`]. The
//! request-timing/audit-recording scaffolding, bounded inflight [`Semaphore`],
//! and fixed-window [`RateLimiter`] mirror the teacher's MCP server; the
//! JSON-RPC envelope is replaced by plain per-endpoint JSON bodies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::ConnectInfo;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Sse;
use axum::response::sse::Event;
use axum::response::sse::KeepAlive;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use cybertip_config::CyberTipConfig;
use cybertip_config::DbModeKind;
use cybertip_config::ToolMode;
use cybertip_core::AgentRequest;
use cybertip_core::ApplicationStandard;
use cybertip_core::AuditEntry;
use cybertip_core::AuditStatus;
use cybertip_core::CircuitRule;
use cybertip_core::CircuitRuleId;
use cybertip_core::DispatchError;
use cybertip_core::Dispatcher;
use cybertip_core::EntryId;
use cybertip_core::FileId;
use cybertip_core::InMemoryTipRepository;
use cybertip_core::LegalReferenceError;
use cybertip_core::LegalReferenceTable;
use cybertip_core::Orchestrator;
use cybertip_core::OrchestratorConfig;
use cybertip_core::OrchestratorError;
use cybertip_core::Oracle;
use cybertip_core::OracleError;
use cybertip_core::PrecedentEffect;
use cybertip_core::PrecedentId;
use cybertip_core::PrecedentUpdate;
use cybertip_core::PreservationRequest;
use cybertip_core::PriorityTier;
use cybertip_core::RepositoryError;
use cybertip_core::RepositoryStats;
use cybertip_core::RequestId;
use cybertip_core::RoutingUnit;
use cybertip_core::SharedTipRepository;
use cybertip_core::StageEvent;
use cybertip_core::StageEventStatus;
use cybertip_core::Timestamp;
use cybertip_core::Tip;
use cybertip_core::TipId;
use cybertip_core::TipListFilter;
use cybertip_core::TipRepository;
use cybertip_core::TipStatus;
use cybertip_core::WarrantStatus;
use cybertip_ingest::ClusterCandidate;
use cybertip_ingest::scan_for_clusters;
use cybertip_oracle::HttpOracle;
use cybertip_oracle::HttpOracleConfig;
use cybertip_oracle::StubOracle;
use cybertip_store_sqlite::SqliteStoreConfig;
use cybertip_store_sqlite::SqliteStoreMode;
use cybertip_store_sqlite::SqliteSyncMode;
use cybertip_store_sqlite::SqliteTipRepository;

use crate::audit::ApiAuditEvent;
use crate::audit::ApiAuditEventParams;
use crate::audit::ApiAuditSink;
use crate::audit::ApiStderrAuditSink;
use crate::dispatch::LoggingDispatcher;

// ============================================================================
// SECTION: Boxed Backends
// ============================================================================

/// Oracle backend boxed so the orchestrator can be named by one concrete type
/// regardless of whether `TOOL_MODE` is `stub` or `real`.
struct BoxedOracle(Box<dyn Oracle + Send + Sync>);

impl Oracle for BoxedOracle {
    fn run_agent(&self, request: &AgentRequest<'_>) -> Result<String, OracleError> {
        self.0.run_agent(request)
    }
}

/// Dispatcher backend boxed for the same reason as [`BoxedOracle`].
struct BoxedDispatcher(Box<dyn Dispatcher + Send + Sync>);

impl Dispatcher for BoxedDispatcher {
    fn send_preservation_letter(&self, request: &PreservationRequest) -> Result<(), DispatchError> {
        self.0.send_preservation_letter(request)
    }
}

/// Concrete orchestrator type served by this crate.
type PipelineOrchestrator = Orchestrator<BoxedOracle, BoxedDispatcher, SharedTipRepository>;

// ============================================================================
// SECTION: Seeded Legal Reference Data
// ============================================================================

/// U.S. state and territory postal codes mapped to their federal judicial
/// circuit, used to back `GET /api/legal/circuit/{state}`. The District of
/// Columbia routes to the D.C. Circuit.
const STATE_CIRCUITS: &[(&str, &str)] = &[
    ("ME", "1st Circuit"),
    ("MA", "1st Circuit"),
    ("NH", "1st Circuit"),
    ("RI", "1st Circuit"),
    ("PR", "1st Circuit"),
    ("CT", "2nd Circuit"),
    ("NY", "2nd Circuit"),
    ("VT", "2nd Circuit"),
    ("DE", "3rd Circuit"),
    ("NJ", "3rd Circuit"),
    ("PA", "3rd Circuit"),
    ("VI", "3rd Circuit"),
    ("MD", "4th Circuit"),
    ("NC", "4th Circuit"),
    ("SC", "4th Circuit"),
    ("VA", "4th Circuit"),
    ("WV", "4th Circuit"),
    ("LA", "5th Circuit"),
    ("MS", "5th Circuit"),
    ("TX", "5th Circuit"),
    ("KY", "6th Circuit"),
    ("MI", "6th Circuit"),
    ("OH", "6th Circuit"),
    ("TN", "6th Circuit"),
    ("IL", "7th Circuit"),
    ("IN", "7th Circuit"),
    ("WI", "7th Circuit"),
    ("AR", "8th Circuit"),
    ("IA", "8th Circuit"),
    ("MN", "8th Circuit"),
    ("MO", "8th Circuit"),
    ("NE", "8th Circuit"),
    ("ND", "8th Circuit"),
    ("SD", "8th Circuit"),
    ("AK", "9th Circuit"),
    ("AZ", "9th Circuit"),
    ("CA", "9th Circuit"),
    ("HI", "9th Circuit"),
    ("ID", "9th Circuit"),
    ("MT", "9th Circuit"),
    ("NV", "9th Circuit"),
    ("OR", "9th Circuit"),
    ("WA", "9th Circuit"),
    ("GU", "9th Circuit"),
    ("MP", "9th Circuit"),
    ("CO", "10th Circuit"),
    ("KS", "10th Circuit"),
    ("NM", "10th Circuit"),
    ("OK", "10th Circuit"),
    ("UT", "10th Circuit"),
    ("WY", "10th Circuit"),
    ("AL", "11th Circuit"),
    ("FL", "11th Circuit"),
    ("GA", "11th Circuit"),
    ("DC", "D.C. Circuit"),
];

/// Resolves a two-letter state/territory code to its federal circuit label.
fn circuit_label_for_state(state: &str) -> Option<&'static str> {
    let upper = state.to_ascii_uppercase();
    STATE_CIRCUITS.iter().find(|(code, _)| *code == upper).map(|(_, label)| *label)
}

/// Builds the starting set of circuit rules consulted by the Wilson Gate.
/// One conservative-default rule per federal circuit; real review notes and
/// citations are filled in later through precedent updates, not seeded here.
fn seed_circuit_rules() -> Vec<CircuitRule> {
    let mut seen = std::collections::BTreeSet::new();
    let now = Timestamp::now();
    STATE_CIRCUITS
        .iter()
        .map(|(_, label)| *label)
        .filter(|label| seen.insert(*label))
        .map(|label| CircuitRule {
            circuit_rule_id: CircuitRuleId::new(format!("seed-{}", label.to_ascii_lowercase().replace([' ', '.'], "-"))),
            circuit_label: label.to_owned(),
            binding_precedent: "no circuit-specific precedent on file".to_owned(),
            application: ApplicationStandard::NoPrecedentConservative,
            file_access_standard_text: "Treat file access as requiring a warrant absent exigent circumstances until reviewed.".to_owned(),
            notes: None,
            citations: Vec::new(),
            last_reviewed: now,
        })
        .collect()
}

// ============================================================================
// SECTION: Rate Limiter
// ============================================================================

/// Maximum number of distinct rate-limit buckets retained before stale
/// entries are evicted. `cybertip_config::RateLimitConfig` carries no
/// capacity field, unlike the teacher's config, so this is hardcoded.
const MAX_RATE_LIMIT_BUCKETS: usize = 10_000;

/// Fixed-window per-key rate limiter, one bucket per peer IP.
struct RateLimiter {
    max_requests: u32,
    window: Duration,
    buckets: Mutex<HashMap<String, RateLimitBucket>>,
}

/// One key's current request count within its active window.
struct RateLimitBucket {
    window_start: Instant,
    count: u32,
    last_seen: Instant,
}

/// Outcome of a rate-limit check.
enum RateLimitDecision {
    /// The request may proceed.
    Allow,
    /// The request must wait `retry_after_ms` before retrying.
    Limited {
        /// Milliseconds until the current window resets.
        retry_after_ms: u64,
    },
}

impl RateLimiter {
    fn new(max_requests: u32, window_ms: u64) -> Self {
        Self { max_requests, window: Duration::from_millis(window_ms), buckets: Mutex::new(HashMap::new()) }
    }

    /// Checks and records one request against `key`'s bucket, evicting
    /// stale buckets first when the table has grown past its cap.
    fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let Ok(mut buckets) = self.buckets.lock() else {
            return RateLimitDecision::Allow;
        };

        if buckets.len() >= MAX_RATE_LIMIT_BUCKETS && !buckets.contains_key(key) {
            let ttl = self.window * 2;
            buckets.retain(|_, bucket| now.duration_since(bucket.last_seen) < ttl);
        }

        let bucket = buckets.entry(key.to_owned()).or_insert_with(|| RateLimitBucket { window_start: now, count: 0, last_seen: now });

        if now.duration_since(bucket.window_start) >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }
        bucket.last_seen = now;

        if bucket.count >= self.max_requests {
            let elapsed = now.duration_since(bucket.window_start);
            let retry_after_ms = u64::try_from(self.window.saturating_sub(elapsed).as_millis()).unwrap_or(u64::MAX);
            return RateLimitDecision::Limited { retry_after_ms };
        }

        bucket.count += 1;
        RateLimitDecision::Allow
    }
}

// ============================================================================
// SECTION: Application State
// ============================================================================

/// Shared application state handed to every handler through axum's `State`.
struct AppState {
    repository: SharedTipRepository,
    orchestrator: Arc<PipelineOrchestrator>,
    legal_reference: Arc<LegalReferenceTable>,
    /// Template receiver the orchestrator's broadcast channel was subscribed
    /// from once at construction time; each SSE client gets its own handle
    /// via `resubscribe`, which does not require mutable access.
    events_template: broadcast::Receiver<StageEvent>,
    audit: Arc<dyn ApiAuditSink>,
    rate_limiter: Option<RateLimiter>,
    inflight: Arc<Semaphore>,
    request_seq: std::sync::atomic::AtomicU64,
}

/// Errors constructing or running [`ApiServer`].
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// The configured durable store could not be opened.
    #[error("durable store unavailable: {0}")]
    Store(String),
    /// The configured oracle backend could not be constructed.
    #[error("oracle backend unavailable: {0}")]
    Oracle(String),
    /// The HTTP listener could not be bound.
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    /// The server failed while serving requests.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// The triage pipeline's HTTP/SSE server.
pub struct ApiServer {
    state: Arc<AppState>,
    bind: String,
}

impl ApiServer {
    /// Builds a server from a fully resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] when the durable store or oracle backend
    /// cannot be constructed.
    pub fn from_config(config: &CyberTipConfig) -> Result<Self, ApiServerError> {
        let repository = match config.db.mode {
            DbModeKind::Memory => SharedTipRepository::from_repository(InMemoryTipRepository::new()),
            DbModeKind::Postgres => {
                let path = config.db.sqlite_path.clone().unwrap_or_else(|| std::path::PathBuf::from("cybertip.sqlite3"));
                let store = SqliteTipRepository::new(SqliteStoreConfig {
                    path,
                    busy_timeout_ms: 5000,
                    journal_mode: SqliteStoreMode::Wal,
                    sync_mode: SqliteSyncMode::Full,
                })
                .map_err(|error| ApiServerError::Store(error.to_string()))?;
                SharedTipRepository::from_repository(store)
            }
        };

        let oracle: BoxedOracle = match config.tool_mode {
            ToolMode::Stub => BoxedOracle(Box::new(StubOracle::new())),
            ToolMode::Real => {
                let http = HttpOracle::new(HttpOracleConfig {
                    endpoint: std::env::var("ORACLE_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:11434/v1/chat/completions".to_owned()),
                    model: std::env::var("ORACLE_MODEL").unwrap_or_else(|_| "default".to_owned()),
                    max_response_bytes: 1_048_576,
                    user_agent: "cybertip-api/0.1".to_owned(),
                })
                .map_err(|error| ApiServerError::Oracle(error.to_string()))?;
                BoxedOracle(Box::new(http))
            }
        };

        let dispatcher = BoxedDispatcher(Box::new(LoggingDispatcher::new(ApiStderrAuditSink)));
        let legal_reference = Arc::new(LegalReferenceTable::new(seed_circuit_rules()));

        let mut orchestrator = Orchestrator::new(
            oracle,
            dispatcher,
            repository.clone(),
            Arc::clone(&legal_reference),
            OrchestratorConfig { demo_mode: config.demo_mode, ..OrchestratorConfig::default() },
        );
        let events_template = orchestrator.subscribe();

        let rate_limiter = config.server.limits.rate_limit.as_ref().map(|limits| RateLimiter::new(limits.max_requests, limits.window_ms));
        let inflight = Arc::new(Semaphore::new(config.server.limits.max_inflight));

        let state = Arc::new(AppState {
            repository,
            orchestrator: Arc::new(orchestrator),
            legal_reference,
            events_template,
            audit: Arc::new(ApiStderrAuditSink),
            rate_limiter,
            inflight,
            request_seq: std::sync::atomic::AtomicU64::new(0),
        });

        Ok(Self { state, bind: config.server.bind.clone() })
    }

    /// Builds the axum [`Router`] for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    /// Runs the server until the process is terminated.
    ///
    /// # Errors
    ///
    /// Returns [`ApiServerError`] if the listener cannot be bound or the
    /// server loop fails.
    pub async fn serve(&self) -> Result<(), ApiServerError> {
        let listener = TcpListener::bind(&self.bind).await.map_err(|error| ApiServerError::Bind(self.bind.clone(), error))?;
        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app).await.map_err(ApiServerError::Serve)
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/queue", get(get_queue))
        .route("/api/tips/{id}", get(get_tip))
        .route("/api/tips/{id}/assign", post(assign_tip))
        .route("/api/tips/{id}/warrant/{file_id}", post(update_warrant))
        .route("/api/preservation/{id}/issue", post(issue_preservation))
        .route("/api/tips/{id}/stream", get(stream_tip))
        .route("/api/stats", get(get_stats))
        .route("/api/crisis", get(get_crisis))
        .route("/api/clusters", get(get_clusters))
        .route("/api/bundles/stats", get(get_bundle_stats))
        .route("/api/jobs/cluster-scan", post(trigger_cluster_scan))
        .route("/api/tips/{id}/mlat", get(get_mlat))
        .route("/api/legal/circuit/{state}", get(get_circuit))
        .route("/api/legal/precedents", get(list_precedents).post(record_precedent))
        .layer(axum::middleware::from_fn_with_state(Arc::clone(&state), request_guard))
        .with_state(state)
}

/// Middleware run on every request: enforces the inflight cap and the
/// per-peer rate limit, then records one [`ApiAuditEvent`] with the
/// handler's wall-clock latency, mirroring the teacher's per-request
/// metrics/audit scaffolding.
async fn request_guard(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = request.method().as_str().to_owned();
    let route = request.uri().path().to_owned();
    let request_bytes = request
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);
    let request_id = state.request_seq.fetch_add(1, std::sync::atomic::Ordering::Relaxed).to_string();

    if let Some(limiter) = &state.rate_limiter
        && let RateLimitDecision::Limited { retry_after_ms } = limiter.check(&addr.ip().to_string())
    {
        let body = Json(ErrorBody { error_kind: "bad_request", message: format!("rate limited; retry after {retry_after_ms}ms") });
        let response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        state.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            request_id,
            method,
            route,
            peer_ip: Some(addr.ip()),
            status: response.status().as_u16(),
            error_kind: Some("bad_request"),
            request_bytes,
            response_bytes: 0,
            latency_ms: 0,
        }));
        return response;
    }

    let Ok(_permit) = state.inflight.clone().try_acquire_owned() else {
        let body = Json(ErrorBody { error_kind: "internal", message: "server at capacity".to_owned() });
        let response = (StatusCode::SERVICE_UNAVAILABLE, body).into_response();
        state.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
            request_id,
            method,
            route,
            peer_ip: Some(addr.ip()),
            status: response.status().as_u16(),
            error_kind: Some("internal"),
            request_bytes,
            response_bytes: 0,
            latency_ms: 0,
        }));
        return response;
    };

    let started = Instant::now();
    let response = next.run(request).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let response_bytes = response
        .headers()
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(0);

    state.audit.record(&ApiAuditEvent::new(ApiAuditEventParams {
        request_id,
        method,
        route,
        peer_ip: Some(addr.ip()),
        status: response.status().as_u16(),
        error_kind: (!response.status().is_success()).then_some("bad_request"),
        request_bytes,
        response_bytes,
        latency_ms,
    }));

    response
}

// ============================================================================
// SECTION: Request/Response DTOs
// ============================================================================

/// Query parameters shared by the tip-listing endpoints. Distinct from
/// [`TipListFilter`] because `crisis_only` needs a `#[serde(default)]` to be
/// usable as an axum query extractor when the caller omits it.
#[derive(Debug, Deserialize)]
struct ListQuery {
    tier: Option<PriorityTier>,
    status: Option<TipStatus>,
    unit: Option<RoutingUnit>,
    #[serde(default)]
    crisis_only: bool,
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

impl From<ListQuery> for TipListFilter {
    fn from(query: ListQuery) -> Self {
        Self { tier: query.tier, status: query.status, unit: query.unit, crisis_only: query.crisis_only, limit: query.limit, offset: query.offset }
    }
}

/// Body for `POST /api/tips/{id}/assign`.
#[derive(Debug, Deserialize)]
struct AssignRequest {
    investigator: String,
    unit: Option<RoutingUnit>,
}

/// Body for `POST /api/tips/{id}/warrant/{fileId}`.
#[derive(Debug, Deserialize)]
struct WarrantUpdateRequest {
    status: WarrantStatus,
    warrant_number: Option<String>,
}

/// Body for `POST /api/preservation/{id}/issue`. The repository's
/// `issue_preservation_request` call requires both the owning tip id and the
/// request id; there is no lookup from request id alone.
#[derive(Debug, Deserialize)]
struct IssuePreservationRequest {
    tip_id: String,
}

/// Body for `POST /api/jobs/cluster-scan`.
#[derive(Debug, Deserialize)]
struct ClusterScanRequest {
    #[serde(default = "default_lookback_days")]
    lookback_days: i64,
}

const fn default_lookback_days() -> i64 {
    7
}

/// Body for `POST /api/legal/precedents`.
#[derive(Debug, Deserialize)]
struct RecordPrecedentRequest {
    precedent_id: String,
    circuit_label: String,
    summary: String,
    effect: PrecedentEffect,
    recorded_by: String,
    #[serde(default)]
    citations: Vec<String>,
}

/// Aggregate bundling statistics for `GET /api/bundles/stats`.
#[derive(Debug, Serialize)]
struct BundleStats {
    bundled_tip_count: usize,
    total_incident_count: u64,
    largest_bundle: u32,
}

/// Contract-only summary for `GET /api/tips/{id}/mlat`. Real MLAT workflow
/// routing is out of scope; this reports the facts a human analyst would
/// need to decide whether to initiate one.
#[derive(Debug, Serialize)]
struct MlatSummary {
    tip_id: String,
    international_nexus: bool,
    countries_involved: Vec<String>,
    interpol_flag: bool,
    europol_flag: bool,
    recommendation: &'static str,
}

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

/// Stable error taxonomy surfaced over HTTP, mirroring the teacher's
/// `error_kind_for_code` table.
#[derive(Debug, Error)]
enum ApiError {
    #[error("authorization blocked: {0}")]
    AuthorizationBlock(String),
    #[error("oracle failure: {0}")]
    OracleFailure(String),
    #[error("validation failure: {0}")]
    ValidationFailure(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::AuthorizationBlock(_) => StatusCode::FORBIDDEN,
            Self::OracleFailure(_) => StatusCode::BAD_GATEWAY,
            Self::ValidationFailure(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::AuthorizationBlock(_) => "authorization_block",
            Self::OracleFailure(_) => "oracle_failure",
            Self::ValidationFailure(_) => "validation_failure",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = Json(ErrorBody { error_kind: self.kind(), message: self.to_string() });
        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error_kind: &'static str,
    message: String,
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => Self::NotFound(message),
            RepositoryError::Io(message) | RepositoryError::Conflict(message) => Self::Internal(message),
        }
    }
}

impl From<LegalReferenceError> for ApiError {
    fn from(error: LegalReferenceError) -> Self {
        match error {
            LegalReferenceError::UnknownCircuitRule(label) => Self::NotFound(format!("circuit rule for {label}")),
            LegalReferenceError::Poisoned => Self::Internal("legal reference table lock poisoned".to_owned()),
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(error: OrchestratorError) -> Self {
        match error {
            OrchestratorError::Fingerprint(message) => Self::ValidationFailure(message),
            OrchestratorError::Repository(error) => error.into(),
            OrchestratorError::Dispatch(error) => Self::Internal(error.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Tip Listing / Detail Handlers
// ============================================================================

async fn get_queue(State(state): State<Arc<AppState>>, Query(query): Query<ListQuery>) -> Result<Json<Vec<Tip>>, ApiError> {
    let filter = TipListFilter::from(query);
    let tips = state
        .repository
        .list(&filter)?
        .into_iter()
        .filter(|tip| !matches!(tip.status, TipStatus::Closed | TipStatus::ReferredOut | TipStatus::Duplicate))
        .collect();
    Ok(Json(tips))
}

async fn get_tip(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Tip>, ApiError> {
    let tip_id = TipId::new(id);
    let tip = state.repository.get(&tip_id)?.ok_or_else(|| ApiError::NotFound(format!("tip {}", tip_id.as_str())))?;
    Ok(Json(tip))
}

async fn assign_tip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<Tip>, ApiError> {
    let tip_id = TipId::new(id);
    let mut tip = state.repository.get(&tip_id)?.ok_or_else(|| ApiError::NotFound(format!("tip {}", tip_id.as_str())))?;

    let previous_status = format!("{:?}", tip.status);
    tip.status = TipStatus::Assigned;
    if let (Some(priority), Some(unit)) = (tip.priority.as_mut(), body.unit) {
        priority.routing_unit = unit;
    }

    tip.push_audit_entry(AuditEntry {
        entry_id: EntryId::new(format!("assign-{}", tip_id.as_str())),
        tip_id: tip_id.clone(),
        seq: 0,
        agent: "tip_repository".to_owned(),
        timestamp: Timestamp::now(),
        duration_ms: None,
        status: AuditStatus::Success,
        summary: format!("assigned to {} (previous status {previous_status})", body.investigator),
        model_used: None,
        error_detail: None,
        human_actor: Some(body.investigator),
        previous_value: None,
        new_value: None,
    });

    state.repository.upsert(&tip)?;
    Ok(Json(tip))
}

async fn update_warrant(
    State(state): State<Arc<AppState>>,
    Path((id, file_id)): Path<(String, String)>,
    Json(body): Json<WarrantUpdateRequest>,
) -> Result<StatusCode, ApiError> {
    let tip_id = TipId::new(id);
    let file_id = FileId::new(file_id);
    state.repository.update_file_warrant(&tip_id, &file_id, body.status, body.warrant_number.as_deref())?;
    Ok(StatusCode::NO_CONTENT)
}

async fn issue_preservation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<IssuePreservationRequest>,
) -> Result<StatusCode, ApiError> {
    let tip_id = TipId::new(body.tip_id);
    let request_id = RequestId::new(id);
    state.repository.issue_preservation_request(&tip_id, &request_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// SECTION: SSE Stream Handler
// ============================================================================

async fn stream_tip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Sse<ReceiverStream<Result<Event, std::convert::Infallible>>> {
    let tip_id = TipId::new(id);
    let mut receiver = state.events_template.resubscribe();
    let (tx, rx) = mpsc::channel::<Result<Event, std::convert::Infallible>>(16);

    tokio::spawn(async move {
        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if event.tip_id != tip_id {
                continue;
            }
            let is_terminal = matches!(event.status, StageEventStatus::Done | StageEventStatus::Error | StageEventStatus::Blocked);
            let Ok(payload) = serde_json::to_string(&event) else {
                break;
            };
            if tx.send(Ok(Event::default().data(payload))).await.is_err() {
                break;
            }
            if is_terminal {
                break;
            }
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default())
}

// ============================================================================
// SECTION: Stats / Crisis / Cluster / Bundle Handlers
// ============================================================================

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<RepositoryStats>, ApiError> {
    Ok(Json(state.repository.stats()?))
}

async fn get_crisis(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Tip>>, ApiError> {
    let filter = TipListFilter { crisis_only: true, ..TipListFilter::default() };
    Ok(Json(state.repository.list(&filter)?))
}

async fn get_clusters(State(state): State<Arc<AppState>>) -> Result<Json<BTreeMap<String, Vec<String>>>, ApiError> {
    let tips = state.repository.list(&TipListFilter::default())?;
    let mut clusters: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for tip in &tips {
        if let Some(links) = &tip.links {
            for flag in &links.cluster_flags {
                clusters.entry(flag.clone()).or_default().push(tip.tip_id.as_str().to_owned());
            }
        }
    }
    Ok(Json(clusters))
}

async fn get_bundle_stats(State(state): State<Arc<AppState>>) -> Result<Json<BundleStats>, ApiError> {
    let tips = state.repository.list(&TipListFilter::default())?;
    let bundled: Vec<&Tip> = tips.iter().filter(|tip| tip.is_bundled).collect();
    let total_incident_count = bundled.iter().map(|tip| u64::from(tip.bundled_incident_count)).sum();
    let largest_bundle = bundled.iter().map(|tip| tip.bundled_incident_count).max().unwrap_or(0);
    Ok(Json(BundleStats { bundled_tip_count: bundled.len(), total_incident_count, largest_bundle }))
}

async fn trigger_cluster_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ClusterScanRequest>,
) -> Result<Json<usize>, ApiError> {
    let tips = state.repository.list(&TipListFilter::default())?;
    let candidates: Vec<ClusterCandidate> = tips
        .iter()
        .map(|tip| ClusterCandidate {
            tip_id: tip.tip_id.clone(),
            received_at: tip.provenance.received_at,
            structural_identifiers: tip.extracted.as_ref().map(|extraction| extraction.identifiers_found.clone()).unwrap_or_default(),
        })
        .collect();

    let assignments = scan_for_clusters(&candidates, body.lookback_days);
    let updated = assignments.len();

    for assignment in assignments {
        if let Some(mut tip) = state.repository.get(&assignment.tip_id)? {
            let links = tip.links.get_or_insert_with(Default::default);
            for flag in assignment.cluster_flags {
                if !links.cluster_flags.contains(&flag) {
                    links.cluster_flags.push(flag);
                }
            }
            state.repository.upsert(&tip)?;
        }
    }

    Ok(Json(updated))
}

async fn get_mlat(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<MlatSummary>, ApiError> {
    let tip_id = TipId::new(id);
    let tip = state.repository.get(&tip_id)?.ok_or_else(|| ApiError::NotFound(format!("tip {}", tip_id.as_str())))?;

    let international_nexus = tip.jurisdiction.interpol_flag || tip.jurisdiction.europol_flag || !tip.jurisdiction.countries_involved.is_empty();
    let recommendation = if international_nexus {
        "international nexus detected; route to International Liaison for MLAT assessment"
    } else {
        "no international nexus detected; MLAT not indicated"
    };

    Ok(Json(MlatSummary {
        tip_id: tip.tip_id.as_str().to_owned(),
        international_nexus,
        countries_involved: tip.jurisdiction.countries_involved.clone(),
        interpol_flag: tip.jurisdiction.interpol_flag,
        europol_flag: tip.jurisdiction.europol_flag,
        recommendation,
    }))
}

// ============================================================================
// SECTION: Legal Reference Handlers
// ============================================================================

async fn get_circuit(State(state): State<Arc<AppState>>, Path(state_code): Path<String>) -> Result<Json<CircuitRule>, ApiError> {
    let label = circuit_label_for_state(&state_code).ok_or_else(|| ApiError::BadRequest(format!("unrecognized state code {state_code}")))?;
    let rule = state.legal_reference.rule_for_circuit(label)?.ok_or_else(|| ApiError::NotFound(format!("circuit rule for {label}")))?;
    Ok(Json(rule))
}

async fn list_precedents(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PrecedentUpdate>>, ApiError> {
    Ok(Json(state.legal_reference.precedent_log()?))
}

async fn record_precedent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordPrecedentRequest>,
) -> Result<StatusCode, ApiError> {
    state.legal_reference.record_precedent_update(PrecedentUpdate {
        precedent_id: PrecedentId::new(body.precedent_id),
        circuit_label: body.circuit_label,
        summary: body.summary,
        effect: body.effect,
        recorded_at: Timestamp::now(),
        recorded_by: body.recorded_by,
        citations: body.citations,
    })?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only framing assertions.")]

    use std::sync::atomic::AtomicU64;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use cybertip_core::Jurisdiction;
    use cybertip_core::JurisdictionLabel;
    use cybertip_core::PriorityResult;
    use cybertip_core::Provenance;
    use cybertip_core::Reporter;
    use cybertip_core::ReporterKind;
    use cybertip_core::SourceChannel;

    use crate::audit::ApiNoopAuditSink;
    use crate::dispatch::LoggingDispatcher;

    #[test]
    fn circuit_lookup_is_case_insensitive() {
        assert_eq!(circuit_label_for_state("ca"), Some("9th Circuit"));
        assert_eq!(circuit_label_for_state("CA"), Some("9th Circuit"));
    }

    #[test]
    fn unknown_state_code_yields_none() {
        assert_eq!(circuit_label_for_state("ZZ"), None);
    }

    #[test]
    fn seeded_rules_cover_every_distinct_circuit_exactly_once() {
        let rules = seed_circuit_rules();
        let mut labels: Vec<&str> = rules.iter().map(|rule| rule.circuit_label.as_str()).collect();
        labels.sort_unstable();
        let mut deduped = labels.clone();
        deduped.dedup();
        assert_eq!(labels.len(), deduped.len());
        assert!(labels.contains(&"D.C. Circuit"));
        assert!(labels.contains(&"9th Circuit"));
    }

    fn sample_tip(id: &str) -> Tip {
        Tip {
            tip_id: TipId::new(id),
            ncmec_tip_number: None,
            upstream_case_number: None,
            provenance: Provenance {
                source: SourceChannel::PartnerPortal,
                received_at: Timestamp::now(),
                raw_body: "raw".to_owned(),
                normalized_body: "raw".to_owned(),
            },
            reporter: Reporter { kind: ReporterKind::Esp, esp_name: Some("Example Platform".to_owned()), originating_country: Some("US".to_owned()) },
            jurisdiction: Jurisdiction { primary: JurisdictionLabel::UsFederal, countries_involved: Vec::new(), interpol_flag: false, europol_flag: false },
            is_bundled: false,
            bundled_incident_count: 1,
            ncmec_urgent_flag: false,
            status: TipStatus::Pending,
            files: Vec::new(),
            preservation_requests: Vec::new(),
            audit: Vec::new(),
            extracted: None,
            hash_matches: None,
            classification: None,
            links: None,
            priority: None,
            legal_status: None,
        }
    }

    fn priority(tier: PriorityTier, supervisor_alert: bool) -> PriorityResult {
        PriorityResult { tier, score: 50, routing_unit: RoutingUnit::GeneralTriage, supervisor_alert, rationale: "seeded for test".to_owned() }
    }

    /// Builds an [`AppState`] wired the same way [`ApiServer::from_config`]
    /// does, but without touching the environment or a durable store, so
    /// handler tests can seed the in-memory repository directly first.
    fn test_state() -> Arc<AppState> {
        let repository = SharedTipRepository::from_repository(InMemoryTipRepository::new());
        let oracle = BoxedOracle(Box::new(StubOracle::new()));
        let dispatcher = BoxedDispatcher(Box::new(LoggingDispatcher::new(ApiNoopAuditSink)));
        let legal_reference = Arc::new(LegalReferenceTable::new(seed_circuit_rules()));

        let mut orchestrator =
            Orchestrator::new(oracle, dispatcher, repository.clone(), Arc::clone(&legal_reference), OrchestratorConfig { demo_mode: true, ..OrchestratorConfig::default() });
        let events_template = orchestrator.subscribe();

        Arc::new(AppState {
            repository,
            orchestrator: Arc::new(orchestrator),
            legal_reference,
            events_template,
            audit: Arc::new(ApiNoopAuditSink),
            rate_limiter: None,
            inflight: Arc::new(Semaphore::new(64)),
            request_seq: AtomicU64::new(0),
        })
    }

    /// Builds a request carrying the `ConnectInfo` extension `request_guard`
    /// requires, which `tower::ServiceExt::oneshot` does not insert on its
    /// own the way a real listener bound with
    /// `into_make_service_with_connect_info` would.
    fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
        let mut request = Request::builder().method(method).uri(uri).header("content-type", "application/json").body(body).expect("build request");
        request.extensions_mut().insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 0))));
        request
    }

    #[tokio::test]
    async fn get_tip_returns_not_found_for_unknown_id() {
        let router = build_router(test_state());
        let response = router.oneshot(request("GET", "/api/tips/missing", Body::empty())).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_tip_returns_seeded_tip() {
        let state = test_state();
        state.repository.upsert(&sample_tip("tip-1")).expect("seed");
        let router = build_router(state);

        let response = router.oneshot(request("GET", "/api/tips/tip-1", Body::empty())).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let tip: Tip = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(tip.tip_id.as_str(), "tip-1");
    }

    #[tokio::test]
    async fn assign_tip_updates_status_and_appends_audit_entry() {
        let state = test_state();
        let mut seeded = sample_tip("tip-1");
        seeded.priority = Some(priority(PriorityTier::Standard, false));
        state.repository.upsert(&seeded).expect("seed");
        let router = build_router(state);

        let body = Body::from(r#"{"investigator":"agent.smith","unit":"cyber_crime_unit"}"#);
        let response = router.clone().oneshot(request("POST", "/api/tips/tip-1/assign", body)).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let tip: Tip = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(tip.status, TipStatus::Assigned);
        assert_eq!(tip.priority.expect("priority").routing_unit, RoutingUnit::CyberCrimeUnit);
        assert_eq!(tip.audit.len(), 1);
        assert_eq!(tip.audit[0].human_actor.as_deref(), Some("agent.smith"));
    }

    #[tokio::test]
    async fn get_stats_reflects_seeded_tips() {
        let state = test_state();
        state.repository.upsert(&sample_tip("tip-1")).expect("seed");
        let mut closed = sample_tip("tip-2");
        closed.status = TipStatus::Closed;
        state.repository.upsert(&closed).expect("seed");
        let router = build_router(state);

        let response = router.oneshot(request("GET", "/api/stats", Body::empty())).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let stats: RepositoryStats = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.closed, 1);
    }

    #[tokio::test]
    async fn get_crisis_filters_by_supervisor_alert() {
        let state = test_state();
        let mut crisis = sample_tip("tip-crisis");
        crisis.priority = Some(priority(PriorityTier::Immediate, true));
        state.repository.upsert(&crisis).expect("seed");
        let mut routine = sample_tip("tip-routine");
        routine.priority = Some(priority(PriorityTier::Standard, false));
        state.repository.upsert(&routine).expect("seed");
        let router = build_router(state);

        let response = router.oneshot(request("GET", "/api/crisis", Body::empty())).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let tips: Vec<Tip> = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].tip_id.as_str(), "tip-crisis");
    }

    #[tokio::test]
    async fn get_circuit_returns_seeded_rule_for_known_state() {
        let router = build_router(test_state());
        let response = router.oneshot(request("GET", "/api/legal/circuit/CA", Body::empty())).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let rule: CircuitRule = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(rule.circuit_label, "9th Circuit");
    }

    #[tokio::test]
    async fn get_circuit_rejects_unknown_state_code() {
        let router = build_router(test_state());
        let response = router.oneshot(request("GET", "/api/legal/circuit/ZZ", Body::empty())).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn record_and_list_precedents_reflects_new_entry() {
        let router = build_router(test_state());

        let body = Body::from(
            r#"{"precedent_id":"prec-1","circuit_label":"9th Circuit","summary":"new ruling","effect":"now_binding","recorded_by":"reviewer","citations":["New v. State"]}"#,
        );
        let record_response = router.clone().oneshot(request("POST", "/api/legal/precedents", body)).await.expect("response");
        assert_eq!(record_response.status(), StatusCode::NO_CONTENT);

        let list_response = router.oneshot(request("GET", "/api/legal/precedents", Body::empty())).await.expect("response");
        assert_eq!(list_response.status(), StatusCode::OK);
        let bytes = list_response.into_body().collect().await.expect("body").to_bytes();
        let precedents: Vec<PrecedentUpdate> = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(precedents.len(), 1);
        assert_eq!(precedents[0].circuit_label, "9th Circuit");
    }

    #[tokio::test]
    async fn rate_limiter_allows_up_to_the_configured_burst_then_limits() {
        let limiter = RateLimiter::new(2, 60_000);
        assert!(matches!(limiter.check("peer"), RateLimitDecision::Allow));
        assert!(matches!(limiter.check("peer"), RateLimitDecision::Allow));
        assert!(matches!(limiter.check("peer"), RateLimitDecision::Limited { .. }));
    }
}
