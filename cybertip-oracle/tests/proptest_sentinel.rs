//! Sentinel wrapping property-based tests.
//!
//! ## Purpose
//! These tests fuzz arbitrary untrusted content to ensure the sentinel
//! wrapper never drops or truncates the underlying text, regardless of what
//! bytes a reporter submits.
//!
//! ## What is covered
//! - Escaping never shrinks the original text.
//! - Escaping is the identity transform on text with no XML-significant
//!   characters.
//!
//! ## What is intentionally out of scope
//! - Specific injection-phrase detection (covered by unit tests in
//!   `src/sentinel.rs`).
// cybertip-oracle/tests/proptest_sentinel.rs
// ============================================================================
// Module: Sentinel Property-Based Tests
// Description: Fuzz-like checks for untrusted-content wrapping and escaping.
// Purpose: Ensure the sentinel never drops or reorders untrusted bytes.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use cybertip_oracle::escape_xml;
use cybertip_oracle::wrap_untrusted_content;
use proptest::prelude::*;

proptest! {
    /// Escaping only ever substitutes a longer byte run for a special
    /// character; it never truncates or reorders the original text, so the
    /// wrapped sentinel always contains the escaped form in full.
    #[test]
    fn wrap_untrusted_content_never_shrinks_the_original_text(content in "\\PC{0,256}") {
        let wrapped = wrap_untrusted_content(&content);
        let escaped = escape_xml(&content);
        prop_assert!(wrapped.contains(&escaped));
        prop_assert!(wrapped.len() >= content.len());
    }

    /// Escaping is the identity transform on text containing none of the
    /// five XML-significant characters.
    #[test]
    fn escape_xml_is_identity_without_special_characters(content in "[^&<>\"']{0,256}") {
        prop_assert_eq!(escape_xml(&content), content);
    }
}
