// cybertip-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Tip Repository
// Description: Durable TipRepository backed by SQLite WAL.
// Purpose: Persist tip aggregates with deterministic serialization and an
//          insert-only audit log.
// Dependencies: cybertip-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`TipRepository`] using `SQLite`. Each
//! write stores the whole `Tip` aggregate as a canonical JSON snapshot,
//! mirroring the aggregate-document shape `Tip` already presents in memory
//! (files, preservation requests, and audit entries all live inside the
//! aggregate). Loads verify integrity via a stored hash and fail closed on
//! corruption. Every audit entry is additionally appended to an insert-only
//! `audit_log` table, keyed by its entry id so repeat writes never duplicate
//! a row already recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use cybertip_core::FileId;
use cybertip_core::RepositoryError;
use cybertip_core::RepositoryStats;
use cybertip_core::RequestId;
use cybertip_core::Tip;
use cybertip_core::TipId;
use cybertip_core::TipListFilter;
use cybertip_core::TipRepository;
use cybertip_core::TipStatus;
use cybertip_core::WarrantStatus;
use cybertip_core::assemble_legal_status;
use cybertip_core::core::audit::AuditEntry;
use cybertip_core::core::audit::AuditStatus;
use cybertip_core::core::hashing::DEFAULT_HASH_ALGORITHM;
use cybertip_core::core::hashing::HashAlgorithm;
use cybertip_core::core::hashing::canonical_json_bytes;
use cybertip_core::core::hashing::hash_bytes;
use cybertip_core::core::identifiers::EntryId;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum tip snapshot size accepted by the store.
pub const MAX_TIP_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` tip repository.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for RepositoryError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Io(message),
            SqliteStoreError::Corrupt(message)
            | SqliteStoreError::VersionMismatch(message)
            | SqliteStoreError::Invalid(message) => Self::Io(message),
            SqliteStoreError::TooLarge { max_bytes, actual_bytes } => Self::Io(format!(
                "tip snapshot exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed tip repository with WAL support.
#[derive(Clone)]
pub struct SqliteTipRepository {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTipRepository {
    /// Opens an `SQLite`-backed tip repository.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    /// Locks the connection, mapping a poisoned mutex to a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))
    }

    /// Writes the current tip snapshot and appends any not-yet-logged audit
    /// entries, all within a single transaction.
    fn write_tip(&self, tip: &Tip) -> Result<(), SqliteStoreError> {
        let canonical_json =
            canonical_json_bytes(tip).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        if canonical_json.len() > MAX_TIP_BYTES {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: MAX_TIP_BYTES,
                actual_bytes: canonical_json.len(),
            });
        }
        let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &canonical_json);
        let tier = tip.priority.as_ref().map(|priority| format!("{:?}", priority.tier));
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        tx.execute(
            "INSERT INTO tips (tip_id, state_json, state_hash, hash_algorithm, status, tier) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT(tip_id) DO UPDATE SET \
             state_json = excluded.state_json, state_hash = excluded.state_hash, \
             hash_algorithm = excluded.hash_algorithm, status = excluded.status, \
             tier = excluded.tier",
            params![
                tip.tip_id.as_str(),
                canonical_json,
                digest.value,
                hash_algorithm_label(digest.algorithm),
                format!("{:?}", tip.status),
                tier,
            ],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        for entry in &tip.audit {
            let entry_json = serde_json::to_vec(entry)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
            tx.execute(
                "INSERT OR IGNORE INTO audit_log (tip_id, entry_id, entry_json) VALUES (?1, ?2, \
                 ?3)",
                params![tip.tip_id.as_str(), entry.entry_id.as_str(), entry_json],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Loads a tip's JSON snapshot, verifying its stored hash.
    fn read_tip(&self, tip_id: &str) -> Result<Option<Tip>, SqliteStoreError> {
        let guard = self.lock()?;
        let row: Option<(Vec<u8>, String, String)> = guard
            .query_row(
                "SELECT state_json, state_hash, hash_algorithm FROM tips WHERE tip_id = ?1",
                params![tip_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        let Some((bytes, expected_hash, hash_algorithm)) = row else {
            return Ok(None);
        };
        let algorithm = parse_hash_algorithm(&hash_algorithm)?;
        let actual = hash_bytes(algorithm, &bytes);
        if actual.value != expected_hash {
            return Err(SqliteStoreError::Corrupt(format!("hash mismatch for tip {tip_id}")));
        }
        let tip: Tip =
            serde_json::from_slice(&bytes).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        Ok(Some(tip))
    }

    /// Loads every tip in the store. Used by `list` and `stats`, which both
    /// need the full aggregate to apply in-process filtering and sorting
    /// identical to [`cybertip_core::InMemoryTipRepository`].
    fn read_all(&self) -> Result<Vec<Tip>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard
            .prepare("SELECT state_json, state_hash, hash_algorithm FROM tips")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = statement
            .query_map(params![], |row| {
                Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut tips = Vec::new();
        for row in rows {
            let (bytes, expected_hash, hash_algorithm) =
                row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let algorithm = parse_hash_algorithm(&hash_algorithm)?;
            let actual = hash_bytes(algorithm, &bytes);
            if actual.value != expected_hash {
                return Err(SqliteStoreError::Corrupt("hash mismatch while scanning tips".to_string()));
            }
            let tip: Tip = serde_json::from_slice(&bytes)
                .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
            tips.push(tip);
        }
        Ok(tips)
    }
}

impl TipRepository for SqliteTipRepository {
    fn upsert(&self, tip: &Tip) -> Result<(), RepositoryError> {
        self.write_tip(tip).map_err(RepositoryError::from)
    }

    fn get(&self, tip_id: &TipId) -> Result<Option<Tip>, RepositoryError> {
        self.read_tip(tip_id.as_str()).map_err(RepositoryError::from)
    }

    fn list(&self, filter: &TipListFilter) -> Result<Vec<Tip>, RepositoryError> {
        let mut matched: Vec<Tip> = self
            .read_all()?
            .into_iter()
            .filter(|tip| filter.tier.is_none_or(|tier| tip.priority.as_ref().is_some_and(|p| p.tier == tier)))
            .filter(|tip| filter.status.is_none_or(|status| tip.status == status))
            .filter(|tip| {
                filter
                    .unit
                    .is_none_or(|unit| tip.priority.as_ref().is_some_and(|p| p.routing_unit == unit))
            })
            .filter(|tip| !filter.crisis_only || tip.priority.as_ref().is_some_and(|p| p.supervisor_alert))
            .collect();

        matched.sort_by(|left, right| {
            let left_tier = left.priority.as_ref().map(|p| p.tier);
            let right_tier = right.priority.as_ref().map(|p| p.tier);
            right_tier.cmp(&left_tier).then_with(|| right.provenance.received_at.cmp(&left.provenance.received_at))
        });

        let start = filter.offset.min(matched.len());
        let end = filter.limit.map_or(matched.len(), |limit| matched.len().min(start + limit));
        Ok(matched[start..end].to_vec())
    }

    fn update_file_warrant(
        &self,
        tip_id: &TipId,
        file_id: &FileId,
        status: WarrantStatus,
        warrant_number: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tip = self
            .read_tip(tip_id.as_str())?
            .ok_or_else(|| RepositoryError::NotFound(format!("tip {}", tip_id.as_str())))?;

        let file = tip
            .files
            .iter_mut()
            .find(|file| file.file_id == *file_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("file {}", file_id.as_str())))?;

        let previous_status = file.warrant_status;
        file.warrant_status = status;
        if let Some(number) = warrant_number {
            file.warrant_number = Some(number.to_owned());
        }
        file.recompute_access_block();

        let relevant_circuit = tip.legal_status.as_ref().and_then(|status| status.relevant_circuit.clone());
        tip.legal_status = Some(assemble_legal_status(&tip, relevant_circuit.as_deref()));

        tip.push_audit_entry(AuditEntry {
            entry_id: EntryId::new(format!("warrant-update-{}", file_id.as_str())),
            tip_id: tip_id.clone(),
            seq: 0,
            agent: "tip_repository".to_owned(),
            timestamp: tip
                .audit
                .last()
                .map_or_else(|| tip.provenance.received_at.clone(), |entry| entry.timestamp.clone()),
            duration_ms: None,
            status: AuditStatus::Success,
            summary: format!(
                "warrant status for file {} changed from {:?} to {:?}",
                file_id.as_str(),
                previous_status,
                status
            ),
            model_used: None,
            error_detail: None,
            human_actor: None,
            previous_value: None,
            new_value: None,
        });

        self.write_tip(&tip).map_err(RepositoryError::from)
    }

    fn issue_preservation_request(
        &self,
        tip_id: &TipId,
        request_id: &RequestId,
    ) -> Result<(), RepositoryError> {
        let mut tip = self
            .read_tip(tip_id.as_str())?
            .ok_or_else(|| RepositoryError::NotFound(format!("tip {}", tip_id.as_str())))?;

        let request = tip
            .preservation_requests
            .iter_mut()
            .find(|request| request.request_id == *request_id)
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("preservation request {}", request_id.as_str()))
            })?;
        request.issue();

        self.write_tip(&tip).map_err(RepositoryError::from)
    }

    fn stats(&self) -> Result<RepositoryStats, RepositoryError> {
        let mut stats = RepositoryStats::default();
        for tip in self.read_all()? {
            stats.total += 1;
            match tip.status {
                TipStatus::Pending => stats.pending += 1,
                TipStatus::Triaged => stats.triaged += 1,
                TipStatus::Assigned => stats.assigned += 1,
                TipStatus::Closed => stats.closed += 1,
                TipStatus::ReferredOut => stats.referred_out += 1,
                TipStatus::Duplicate => stats.duplicate += 1,
                TipStatus::Blocked => stats.blocked += 1,
            }
        }
        Ok(stats)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS tips (
                    tip_id TEXT PRIMARY KEY,
                    state_json BLOB NOT NULL,
                    state_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    status TEXT NOT NULL,
                    tier TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_tips_status ON tips (status);
                CREATE INDEX IF NOT EXISTS idx_tips_tier ON tips (tier);
                CREATE TABLE IF NOT EXISTS audit_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    tip_id TEXT NOT NULL,
                    entry_id TEXT NOT NULL,
                    entry_json BLOB NOT NULL,
                    UNIQUE (tip_id, entry_id),
                    FOREIGN KEY (tip_id) REFERENCES tips(tip_id) ON DELETE CASCADE
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the stable label persisted for a hash algorithm.
const fn hash_algorithm_label(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => "sha256",
    }
}

/// Parses a hash algorithm label back into [`HashAlgorithm`].
fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteStoreError> {
    match label {
        "sha256" => Ok(HashAlgorithm::Sha256),
        other => Err(SqliteStoreError::Corrupt(format!("unknown hash algorithm: {other}"))),
    }
}
