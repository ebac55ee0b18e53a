// cybertip-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Argument Parsing Tests
// Description: Unit tests for the top-level subcommand dispatcher.
// Purpose: Ensure each subcommand parses its arguments as expected.
// Dependencies: clap, cybertip-cli main helpers
// ============================================================================

//! ## Overview
//! Validates that `serve`, `migrate`, and `demo-ingest` parse through
//! [`clap::Parser`] with their documented defaults.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only framing assertions.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;

use super::Cli;
use super::Commands;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn serve_defaults_to_loopback_only() {
    let cli = Cli::try_parse_from(["cybertip", "serve"]).expect("parse serve");
    match cli.command {
        Commands::Serve(command) => assert!(!command.allow_non_loopback),
        other => panic!("expected serve, got {other:?}"),
    }
}

#[test]
fn serve_accepts_non_loopback_opt_in_flag() {
    let cli = Cli::try_parse_from(["cybertip", "serve", "--allow-non-loopback"]).expect("parse serve");
    match cli.command {
        Commands::Serve(command) => assert!(command.allow_non_loopback),
        other => panic!("expected serve, got {other:?}"),
    }
}

#[test]
fn migrate_parses_with_no_arguments() {
    let cli = Cli::try_parse_from(["cybertip", "migrate"]).expect("parse migrate");
    assert!(matches!(cli.command, Commands::Migrate(_)));
}

#[test]
fn demo_ingest_defaults_its_tip_id() {
    let cli = Cli::try_parse_from(["cybertip", "demo-ingest"]).expect("parse demo-ingest");
    match cli.command {
        Commands::DemoIngest(command) => assert_eq!(command.tip_id, "demo-tip-0001"),
        other => panic!("expected demo-ingest, got {other:?}"),
    }
}

#[test]
fn demo_ingest_accepts_a_custom_tip_id() {
    let cli = Cli::try_parse_from(["cybertip", "demo-ingest", "--tip-id", "tip-9"]).expect("parse demo-ingest");
    match cli.command {
        Commands::DemoIngest(command) => assert_eq!(command.tip_id, "tip-9"),
        other => panic!("expected demo-ingest, got {other:?}"),
    }
}

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["cybertip"]).is_err());
}
