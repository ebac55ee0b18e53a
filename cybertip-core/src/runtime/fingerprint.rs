// cybertip-core/src/runtime/fingerprint.rs
// ============================================================================
// Module: CyberTip Fingerprinting
// Description: Stable dedup fingerprint for ingested tips.
// Purpose: Compute a deterministic fingerprint from a tip's source tag,
//          normalized body, and structural identifiers.
// Dependencies: crate::core::hashing, serde
// ============================================================================

//! ## Overview
//! The fingerprint is the stable hash of `(source_tag, normalized_body,
//! structural_identifiers)`, canonicalized as JSON (RFC 8785) and hashed
//! with SHA-256, reusing `core::hashing` rather than a hand-rolled digest.
//! The same inputs always yield the same fingerprint, regardless of
//! `structural_identifiers` ordering as supplied, because the vector is
//! sorted before hashing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_canonical_json;

// ============================================================================
// SECTION: Fingerprint Input
// ============================================================================

/// Canonicalized shape hashed to produce a fingerprint.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    /// Stable tag for the tip's source channel.
    source_tag: &'a str,
    /// Whitespace-normalized submission body.
    normalized_body: &'a str,
    /// Structural identifiers, sorted for order independence.
    structural_identifiers: Vec<&'a str>,
}

// ============================================================================
// SECTION: Fingerprint Computation
// ============================================================================

/// Computes the stable dedup fingerprint for a tip submission.
///
/// # Errors
///
/// Returns an error string when canonical-JSON serialization fails; this
/// should not happen for well-formed `&str` inputs.
pub fn compute_fingerprint(
    source_tag: &str,
    normalized_body: &str,
    structural_identifiers: &[String],
) -> Result<HashDigest, String> {
    let mut sorted: Vec<&str> = structural_identifiers.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let input = FingerprintInput {
        source_tag,
        normalized_body,
        structural_identifiers: sorted,
    };
    hash_canonical_json(HashAlgorithm::Sha256, &input).map_err(|err| err.to_string())
}
