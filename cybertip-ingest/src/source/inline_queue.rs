// cybertip-ingest/src/source/inline_queue.rs
// ============================================================================
// Module: Inline Queue Source
// Description: In-process submission queue for push-based channels.
// Purpose: Implement `ReporterSource` for `InterAgency` and `PublicWebForm`.
// Dependencies: cybertip-core, std
// ============================================================================

//! ## Overview
//! Generalizes the no-external-I/O idiom of an inline payload source:
//! instead of decoding a payload embedded in a URI, [`InlineQueueSource`]
//! holds submissions handed to it directly by a caller (an inter-agency
//! sync job, a public web form handler) until the next [`ReporterSource::poll`]
//! drains them. There is nothing to fetch and nothing to fail; `poll` never
//! returns an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Mutex;

use cybertip_core::core::tip::SourceChannel;
use cybertip_core::interfaces::RawTipInput;
use cybertip_core::interfaces::ReporterSource;
use cybertip_core::interfaces::SourceError;

// ============================================================================
// SECTION: Inline Queue Source
// ============================================================================

/// Push-based submission queue for a single channel.
#[derive(Debug)]
pub struct InlineQueueSource {
    /// Channel this instance reports submissions under.
    channel: SourceChannel,
    /// Submissions awaiting the next poll.
    pending: Mutex<VecDeque<RawTipInput>>,
}

impl InlineQueueSource {
    /// Creates an empty inline queue for `channel`.
    #[must_use]
    pub const fn new(channel: SourceChannel) -> Self {
        Self { channel, pending: Mutex::new(VecDeque::new()) }
    }

    /// Submits one raw tip input for delivery on the next poll.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned by a prior panic while held.
    pub fn submit(&self, input: RawTipInput) {
        let mut pending = self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        pending.push_back(input);
    }
}

impl ReporterSource for InlineQueueSource {
    fn channel(&self) -> SourceChannel {
        self.channel
    }

    fn poll(&mut self) -> Result<Vec<RawTipInput>, SourceError> {
        let mut pending = self.pending.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(pending.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only framing assertions.")]

    use cybertip_core::interfaces::RawContentType;
    use cybertip_core::interfaces::RawTipInput;

    use super::InlineQueueSource;
    use super::ReporterSource;
    use super::SourceChannel;

    fn sample_input(body: &str) -> RawTipInput {
        RawTipInput {
            source: SourceChannel::InterAgency,
            raw_content: body.to_string(),
            content_type: RawContentType::Json,
            received_at: None,
            metadata: None,
        }
    }

    #[test]
    fn poll_drains_every_submitted_input_exactly_once() {
        let mut source = InlineQueueSource::new(SourceChannel::InterAgency);
        source.submit(sample_input("first"));
        source.submit(sample_input("second"));

        let first_poll = source.poll().expect("poll");
        assert_eq!(first_poll.len(), 2);

        let second_poll = source.poll().expect("poll");
        assert!(second_poll.is_empty());
    }

    #[test]
    fn reports_its_configured_channel() {
        let source = InlineQueueSource::new(SourceChannel::PublicWebForm);
        assert_eq!(source.channel(), SourceChannel::PublicWebForm);
    }
}
