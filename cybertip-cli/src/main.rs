// cybertip-cli/src/main.rs
// ============================================================================
// Module: CyberTip CLI Entry Point
// Description: Command dispatcher for the CyberTip API server, store
//              migration, and local demo ingestion.
// Purpose: Provide a safe, operator-facing CLI around the triage pipeline.
// Dependencies: clap, cybertip-api, cybertip-config, cybertip-core,
//               cybertip-ingest, cybertip-store-sqlite, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The CyberTip CLI wraps three operator workflows: `serve` launches the
//! HTTP/SSE API over the triage pipeline, `migrate` opens (and, if absent,
//! creates) the durable `SQLite` store at the configured path, and
//! `demo-ingest` runs one seeded submission through the full enrichment
//! pipeline for local smoke-testing. All three read
//! [`cybertip_config::CyberTipConfig`] from the process environment; there
//! is no CLI-level config file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use cybertip_api::ApiServer;
use cybertip_api::ApiStderrAuditSink;
use cybertip_api::LoggingDispatcher;
use cybertip_config::CyberTipConfig;
use cybertip_config::DbModeKind;
use cybertip_core::InMemoryTipRepository;
use cybertip_core::LegalReferenceTable;
use cybertip_core::Orchestrator;
use cybertip_core::OrchestratorConfig;
use cybertip_core::RawContentType;
use cybertip_core::RawTipInput;
use cybertip_core::SharedTipRepository;
use cybertip_core::SourceChannel;
use cybertip_core::TipId;
use cybertip_oracle::StubOracle;
use cybertip_store_sqlite::SqliteStoreConfig;
use cybertip_store_sqlite::SqliteStoreMode;
use cybertip_store_sqlite::SqliteSyncMode;
use cybertip_store_sqlite::SqliteTipRepository;
use thiserror::Error;

use crate::serve_policy::enforce_local_only;
use crate::serve_policy::resolve_allow_non_loopback;

/// Bind policy helpers for the `serve` command.
mod serve_policy;

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "cybertip", disable_help_subcommand = true, arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the CyberTip HTTP/SSE API server.
    Serve(ServeCommand),
    /// Open the configured durable store, creating its schema if absent.
    Migrate(MigrateCommand),
    /// Run one seeded submission through the enrichment pipeline.
    DemoIngest(DemoIngestCommand),
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Allow binding to a non-loopback address (requires a rate limit).
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Arguments for the `migrate` command.
#[derive(Args, Debug)]
struct MigrateCommand {}

/// Arguments for the `demo-ingest` command.
#[derive(Args, Debug)]
struct DemoIngestCommand {
    /// Identifier to assign to the demo tip.
    #[arg(long, value_name = "ID", default_value = "demo-tip-0001")]
    tip_id: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for command failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Migrate(command) => command_migrate(command),
        Commands::DemoIngest(command) => command_demo_ingest(command).await,
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = CyberTipConfig::from_env().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;

    let allow_non_loopback = resolve_allow_non_loopback(command.allow_non_loopback)
        .map_err(|err| CliError::new(format!("failed to resolve non-loopback policy: {err}")))?;
    let outcome =
        enforce_local_only(&config.server, allow_non_loopback).map_err(|err| CliError::new(format!("bind rejected: {err}")))?;
    warn_local_only(outcome.network_exposed)?;

    let server = ApiServer::from_config(&config).map_err(|err| CliError::new(format!("failed to initialize server: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;

    Ok(ExitCode::SUCCESS)
}

/// Emits a local-only warning banner for the API server.
fn warn_local_only(network_exposed: bool) -> CliResult<()> {
    write_stderr_line("cybertip: API carries no authentication of its own; keep it behind a trusted network boundary")
        .map_err(|err| CliError::new(format!("failed to write to stderr: {err}")))?;
    if network_exposed {
        write_stderr_line("cybertip: bound to a non-loopback address; this was an explicit opt-in")
            .map_err(|err| CliError::new(format!("failed to write to stderr: {err}")))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Migrate Command
// ============================================================================

/// Executes the `migrate` command: opens the configured store, creating its
/// schema if this is the first run against the given path.
fn command_migrate(_command: MigrateCommand) -> CliResult<ExitCode> {
    let config = CyberTipConfig::from_env().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;

    match config.db.mode {
        DbModeKind::Memory => {
            write_stdout_line("cybertip: DB_MODE=memory has no schema to migrate")
                .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))?;
        }
        DbModeKind::Postgres => {
            let path = config.db.sqlite_path.clone().ok_or_else(|| CliError::new("DB_MODE=postgres requires DB_SQLITE_PATH"))?;
            let _store = SqliteTipRepository::new(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: 5000,
                journal_mode: SqliteStoreMode::Wal,
                sync_mode: SqliteSyncMode::Full,
            })
            .map_err(|err| CliError::new(format!("failed to open store at {}: {err}", path.display())))?;
            write_stdout_line(&format!("cybertip: store at {} is up to date", path.display()))
                .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Demo Ingest Command
// ============================================================================

/// Executes the `demo-ingest` command: runs one seeded submission through
/// the full enrichment pipeline against the configured store and prints the
/// resulting disposition.
async fn command_demo_ingest(command: DemoIngestCommand) -> CliResult<ExitCode> {
    let config = CyberTipConfig::from_env().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;

    let repository = match config.db.mode {
        DbModeKind::Memory => SharedTipRepository::from_repository(InMemoryTipRepository::new()),
        DbModeKind::Postgres => {
            let path = config.db.sqlite_path.clone().ok_or_else(|| CliError::new("DB_MODE=postgres requires DB_SQLITE_PATH"))?;
            let store = SqliteTipRepository::new(SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: 5000,
                journal_mode: SqliteStoreMode::Wal,
                sync_mode: SqliteSyncMode::Full,
            })
            .map_err(|err| CliError::new(format!("failed to open store at {}: {err}", path.display())))?;
            SharedTipRepository::from_repository(store)
        }
    };

    let oracle = StubOracle::new();
    let dispatcher = LoggingDispatcher::new(ApiStderrAuditSink);
    let legal_reference = std::sync::Arc::new(LegalReferenceTable::new(Vec::new()));

    let mut orchestrator = Orchestrator::new(
        oracle,
        dispatcher,
        repository,
        legal_reference,
        OrchestratorConfig { demo_mode: true, ..OrchestratorConfig::default() },
    );
    let _events = orchestrator.subscribe();

    let input = demo_submission();
    let tip = orchestrator
        .process(TipId::new(command.tip_id), input)
        .await
        .map_err(|err| CliError::new(format!("pipeline processing failed: {err}")))?;

    let priority = tip.priority.as_ref().map_or_else(|| "unassigned".to_owned(), |priority| format!("{:?}", priority.tier));
    write_stdout_line(&format!("cybertip: ingested {} -> status {:?}, priority {priority}", tip.tip_id.as_str(), tip.status))
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))?;

    Ok(ExitCode::SUCCESS)
}

/// Builds the seeded demo submission processed by `demo-ingest`.
fn demo_submission() -> RawTipInput {
    RawTipInput {
        source: SourceChannel::PartnerPortal,
        raw_content: "NCMEC CyberTip demo submission: suspected CSAM upload flagged by automated ESP scanning.".to_owned(),
        content_type: RawContentType::Text,
        received_at: None,
        metadata: None,
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("cybertip: error: {message}"));
    ExitCode::FAILURE
}
