// cybertip-ingest/src/cluster.rs
// ============================================================================
// Module: Cluster Scan
// Description: Groups recently ingested tips that share structural
//              identifiers into cluster flags.
// Purpose: Surface probable multi-tip incidents without coupling the
//          ingest crate to a repository implementation.
// Dependencies: cybertip-core
// ============================================================================

//! ## Overview
//! `scan_for_clusters` is a pure function over caller-supplied tip
//! summaries: it never reads or writes a repository itself. An orchestrator
//! or CLI subcommand pulls recent tips from `TipRepository`, hands their
//! `(TipId, Timestamp, structural_identifiers)` tuples here on a schedule,
//! and writes the returned cluster labels back onto each tip's
//! `links.cluster_flags`. Two tips cluster together when they share at
//! least one structural identifier and both fall inside the bounded lookback
//! window, measured from the newer of the two.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use cybertip_core::core::identifiers::TipId;
use cybertip_core::core::time::Timestamp;

// ============================================================================
// SECTION: Cluster Input
// ============================================================================

/// One tip's identifying summary, as supplied to a cluster scan.
#[derive(Debug, Clone)]
pub struct ClusterCandidate {
    /// Identifier of the tip being summarized.
    pub tip_id: TipId,
    /// When the tip was received, used to bound the lookback window.
    pub received_at: Timestamp,
    /// Structural identifiers extracted from the tip (account handles,
    /// device identifiers, payment references, and similar).
    pub structural_identifiers: Vec<String>,
}

/// Cluster assignment produced for one tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    /// Identifier of the tip this assignment applies to.
    pub tip_id: TipId,
    /// Cluster labels to merge into the tip's `links.cluster_flags`.
    pub cluster_flags: Vec<String>,
}

// ============================================================================
// SECTION: Cluster Scan
// ============================================================================

/// Scans `candidates` for tips sharing a structural identifier within
/// `lookback_days` of each other, measured from the newer of any pair, and
/// returns one cluster label per shared identifier for every tip it
/// participates in.
///
/// Candidates outside every other candidate's lookback window and sharing
/// no identifier with anything receive no assignment and are omitted from
/// the result, matching `links.cluster_flags`'s default of empty.
#[must_use]
pub fn scan_for_clusters(
    candidates: &[ClusterCandidate],
    lookback_days: i64,
) -> Vec<ClusterAssignment> {
    let mut identifier_to_tips: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        for identifier in &candidate.structural_identifiers {
            identifier_to_tips.entry(identifier.as_str()).or_default().push(index);
        }
    }

    let mut flags_by_index: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
    for (identifier, indices) in &identifier_to_tips {
        if indices.len() < 2 {
            continue;
        }
        for (position, &left_index) in indices.iter().enumerate() {
            for &right_index in &indices[position + 1..] {
                if within_lookback_window(
                    &candidates[left_index].received_at,
                    &candidates[right_index].received_at,
                    lookback_days,
                ) {
                    let label = cluster_label(identifier);
                    flags_by_index.entry(left_index).or_default().insert(label.clone());
                    flags_by_index.entry(right_index).or_default().insert(label);
                }
            }
        }
    }

    flags_by_index
        .into_iter()
        .map(|(index, flags)| ClusterAssignment {
            tip_id: candidates[index].tip_id.clone(),
            cluster_flags: flags.into_iter().collect(),
        })
        .collect()
}

/// Returns true when the two timestamps fall within `lookback_days` of each
/// other, in either direction.
fn within_lookback_window(left: &Timestamp, right: &Timestamp, lookback_days: i64) -> bool {
    let left_unix = left.as_offset_datetime().unix_timestamp();
    let right_unix = right.as_offset_datetime().unix_timestamp();
    let window_seconds = lookback_days.saturating_mul(86_400);
    (left_unix - right_unix).abs() <= window_seconds
}

/// Builds the stable cluster-flag label for a shared structural identifier.
fn cluster_label(identifier: &str) -> String {
    format!("shared_identifier:{identifier}")
}
