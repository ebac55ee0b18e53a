// cybertip-core/src/runtime/memory_store.rs
// ============================================================================
// Module: CyberTip In-Memory Repository
// Description: In-memory tip repository for tests and local demos.
// Purpose: Provide a deterministic, dependency-free `TipRepository` for
//          development and test harnesses.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Generalizes `runtime::store::InMemoryRunStateStore`'s mutex-guarded
//! `BTreeMap` pattern from run states to tips. Not intended for production
//! use; `cybertip-store-sqlite` is the durable backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::audit::AuditEntry;
use crate::core::audit::AuditStatus;
use crate::core::file::WarrantStatus;
use crate::core::identifiers::EntryId;
use crate::core::identifiers::FileId;
use crate::core::identifiers::RequestId;
use crate::core::identifiers::TipId;
use crate::core::tip::Tip;
use crate::core::tip::TipStatus;
use crate::interfaces::RepositoryError;
use crate::interfaces::RepositoryStats;
use crate::interfaces::TipListFilter;
use crate::interfaces::TipRepository;
use crate::runtime::wilson;

// ============================================================================
// SECTION: In-Memory Repository
// ============================================================================

/// In-memory tip repository for tests and local demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTipRepository {
    /// Tips keyed by tip id, protected by a mutex.
    tips: Arc<Mutex<BTreeMap<String, Tip>>>,
}

impl InMemoryTipRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tips: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Locks the tip map, mapping a poisoned mutex to a repository error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Tip>>, RepositoryError> {
        self.tips
            .lock()
            .map_err(|_| RepositoryError::Io("tip repository mutex poisoned".to_owned()))
    }
}

impl TipRepository for InMemoryTipRepository {
    fn upsert(&self, tip: &Tip) -> Result<(), RepositoryError> {
        self.lock()?
            .insert(tip.tip_id.as_str().to_owned(), tip.clone());
        Ok(())
    }

    fn get(&self, tip_id: &TipId) -> Result<Option<Tip>, RepositoryError> {
        Ok(self.lock()?.get(tip_id.as_str()).cloned())
    }

    fn list(&self, filter: &TipListFilter) -> Result<Vec<Tip>, RepositoryError> {
        let guard = self.lock()?;
        let mut matched: Vec<Tip> = guard
            .values()
            .filter(|tip| filter.tier.is_none_or(|tier| tip.priority.as_ref().is_some_and(|p| p.tier == tier)))
            .filter(|tip| filter.status.is_none_or(|status| tip.status == status))
            .filter(|tip| {
                filter
                    .unit
                    .is_none_or(|unit| tip.priority.as_ref().is_some_and(|p| p.routing_unit == unit))
            })
            .filter(|tip| {
                !filter.crisis_only
                    || tip.priority.as_ref().is_some_and(|p| p.supervisor_alert)
            })
            .cloned()
            .collect();

        matched.sort_by(|left, right| {
            let left_tier = left.priority.as_ref().map(|p| p.tier);
            let right_tier = right.priority.as_ref().map(|p| p.tier);
            right_tier
                .cmp(&left_tier)
                .then_with(|| right.provenance.received_at.cmp(&left.provenance.received_at))
        });

        let start = filter.offset.min(matched.len());
        let end = filter
            .limit
            .map_or(matched.len(), |limit| matched.len().min(start + limit));
        Ok(matched[start..end].to_vec())
    }

    fn update_file_warrant(
        &self,
        tip_id: &TipId,
        file_id: &FileId,
        status: WarrantStatus,
        warrant_number: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let tip = guard
            .get_mut(tip_id.as_str())
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
        tip.legal_status = Some(wilson::assemble_legal_status(tip, relevant_circuit.as_deref()));

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

        Ok(())
    }

    fn issue_preservation_request(
        &self,
        tip_id: &TipId,
        request_id: &RequestId,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let tip = guard
            .get_mut(tip_id.as_str())
            .ok_or_else(|| RepositoryError::NotFound(format!("tip {}", tip_id.as_str())))?;

        let request = tip
            .preservation_requests
            .iter_mut()
            .find(|request| request.request_id == *request_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("preservation request {}", request_id.as_str())))?;

        request.issue();
        Ok(())
    }

    fn stats(&self) -> Result<RepositoryStats, RepositoryError> {
        let guard = self.lock()?;
        let mut stats = RepositoryStats::default();
        for tip in guard.values() {
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
// SECTION: Shared Repository Wrapper
// ============================================================================

/// Shared tip repository backed by an `Arc` trait object, mirroring the
/// in-memory wrapper so callers can hold either backend behind one type.
#[derive(Clone)]
pub struct SharedTipRepository {
    /// The wrapped repository implementation.
    inner: Arc<dyn TipRepository + Send + Sync>,
}

impl SharedTipRepository {
    /// Wraps a repository implementation in a shared, clonable handle.
    #[must_use]
    pub fn from_repository(repository: impl TipRepository + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(repository),
        }
    }
}

impl TipRepository for SharedTipRepository {
    fn upsert(&self, tip: &Tip) -> Result<(), RepositoryError> {
        self.inner.upsert(tip)
    }

    fn get(&self, tip_id: &TipId) -> Result<Option<Tip>, RepositoryError> {
        self.inner.get(tip_id)
    }

    fn list(&self, filter: &TipListFilter) -> Result<Vec<Tip>, RepositoryError> {
        self.inner.list(filter)
    }

    fn update_file_warrant(
        &self,
        tip_id: &TipId,
        file_id: &FileId,
        status: WarrantStatus,
        warrant_number: Option<&str>,
    ) -> Result<(), RepositoryError> {
        self.inner.update_file_warrant(tip_id, file_id, status, warrant_number)
    }

    fn issue_preservation_request(
        &self,
        tip_id: &TipId,
        request_id: &RequestId,
    ) -> Result<(), RepositoryError> {
        self.inner.issue_preservation_request(tip_id, request_id)
    }

    fn stats(&self) -> Result<RepositoryStats, RepositoryError> {
        self.inner.stats()
    }
}
