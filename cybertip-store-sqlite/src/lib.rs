// cybertip-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Tip Repository
// Description: Durable TipRepository backend using SQLite WAL.
// Purpose: Provide production-grade persistence for CyberTip tip aggregates.
// Dependencies: cybertip-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a `SQLite`-backed [`cybertip_core::TipRepository`]
//! implementation that persists canonical tip snapshots plus an insert-only
//! audit log. It is designed for deterministic serialization and crash
//! recovery: every write hashes the canonical JSON it stores, and every
//! read re-verifies that hash before returning a tip.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_TIP_BYTES;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::SqliteTipRepository;
