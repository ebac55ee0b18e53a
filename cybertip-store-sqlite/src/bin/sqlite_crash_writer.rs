//! `SQLite` crash writer for store durability tests.
// cybertip-store-sqlite/src/bin/sqlite_crash_writer.rs
// ============================================================================
// Binary: SQLite Crash Writer
// Description: Simulates a crash during an uncommitted tip write.
// Purpose: Support durability tests for rollback/crash recovery behavior.
// Dependencies: cybertip-core, cybertip-store-sqlite, rusqlite
// ============================================================================

use std::env;
use std::path::PathBuf;

use cybertip_core::core::hashing::DEFAULT_HASH_ALGORITHM;
use cybertip_core::core::hashing::canonical_json_bytes;
use cybertip_core::core::hashing::hash_bytes;
use cybertip_core::core::identifiers::TipId;
use cybertip_core::core::tip::Jurisdiction;
use cybertip_core::core::tip::JurisdictionLabel;
use cybertip_core::core::tip::Provenance;
use cybertip_core::core::tip::Reporter;
use cybertip_core::core::tip::ReporterKind;
use cybertip_core::core::tip::SourceChannel;
use cybertip_core::core::tip::Tip;
use cybertip_core::core::tip::TipStatus;
use cybertip_core::core::time::Timestamp;
use cybertip_store_sqlite::SqliteStoreConfig;
use cybertip_store_sqlite::SqliteStoreMode;
use cybertip_store_sqlite::SqliteSyncMode;
use cybertip_store_sqlite::SqliteTipRepository;
use rusqlite::params;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "missing sqlite path"))?;
    let tip_id = args.next().unwrap_or_else(|| "tip-1".to_string());
    let path = PathBuf::from(path);

    let config = SqliteStoreConfig {
        path: path.clone(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    // Opening through the real store creates the schema; the crash is
    // simulated afterward through a raw, never-committed connection.
    let _store = SqliteTipRepository::new(config)?;

    let tip = sample_tip(&tip_id);
    let canonical_json = canonical_json_bytes(&tip)?;
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &canonical_json);

    let mut conn = rusqlite::Connection::open(&path)?;
    conn.execute_batch(
        "PRAGMA foreign_keys = ON; PRAGMA journal_mode = wal; PRAGMA synchronous = full;",
    )?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO tips (tip_id, state_json, state_hash, hash_algorithm, status, tier) VALUES \
         (?1, ?2, ?3, ?4, ?5, NULL)",
        params![tip.tip_id.as_str(), canonical_json, digest.value, "sha256", "pending"],
    )?;

    std::process::abort();
}

/// Builds a minimal tip used by the crash writer.
fn sample_tip(tip_id: &str) -> Tip {
    Tip {
        tip_id: TipId::new(tip_id),
        ncmec_tip_number: None,
        upstream_case_number: None,
        provenance: Provenance {
            source: SourceChannel::PartnerPortal,
            received_at: Timestamp::now(),
            raw_body: "raw".to_owned(),
            normalized_body: "raw".to_owned(),
        },
        reporter: Reporter { kind: ReporterKind::Esp, esp_name: None, originating_country: None },
        jurisdiction: Jurisdiction {
            primary: JurisdictionLabel::Unknown,
            countries_involved: Vec::new(),
            interpol_flag: false,
            europol_flag: false,
        },
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
