// cybertip-ingest/src/source/mod.rs
// ============================================================================
// Module: Tip Source Adapters
// Description: `ReporterSource` implementations, one family per channel.
// Purpose: Turn external submissions into `RawTipInput` values without the
//          queue or orchestrator knowing how any one channel is polled.
// Dependencies: cybertip-core
// ============================================================================

//! ## Overview
//! Each adapter implements [`cybertip_core::interfaces::ReporterSource`] for
//! exactly one [`cybertip_core::core::tip::SourceChannel`]. [`http_poll`]
//! covers the two API-polled channels (`PartnerPortal`, `PartnerApi`),
//! [`file_drop`] covers `Email` ingestion from a rooted drop directory, and
//! [`inline_queue`] covers the two push-based channels (`InterAgency`,
//! `PublicWebForm`) that submit directly with no external I/O. The adapter
//! errors reuse [`cybertip_core::interfaces::SourceError`] rather than a
//! locally defined error type, so the queue's `enqueue` path stays agnostic
//! to which adapter produced a given [`cybertip_core::interfaces::RawTipInput`].

pub mod file_drop;
pub mod http_poll;
pub mod inline_queue;

pub use cybertip_core::interfaces::RawContentType;
pub use cybertip_core::interfaces::RawTipInput;
pub use cybertip_core::interfaces::ReporterSource;
pub use cybertip_core::interfaces::SourceError;

pub use file_drop::FileDropSource;
pub use http_poll::HttpPollConfig;
pub use http_poll::HttpPollSource;
pub use inline_queue::InlineQueueSource;
