// cybertip-ingest/src/source/file_drop.rs
// ============================================================================
// Module: File Drop Source
// Description: Polls a rooted directory for email submissions dropped as files.
// Purpose: Implement `ReporterSource` for the `Email` channel.
// Dependencies: cybertip-core, std
// ============================================================================

//! ## Overview
//! [`FileDropSource`] watches one directory for new files and treats each as
//! a single email submission. A processed file is renamed in place with a
//! `.processed` suffix immediately after it is read, so a crashed or
//! restarted poller does not redeliver it. Path traversal is not a concern
//! here the way it is for a URI-addressed fetch: the adapter only ever lists
//! and opens entries of its own configured root, it never resolves an
//! externally supplied path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use cybertip_core::interfaces::RawContentType;
use cybertip_core::interfaces::RawTipInput;
use cybertip_core::interfaces::ReporterSource;
use cybertip_core::interfaces::SourceError;
use cybertip_core::core::tip::SourceChannel;

/// Suffix appended to a drop file once it has been read and queued.
const PROCESSED_SUFFIX: &str = ".processed";

// ============================================================================
// SECTION: File Drop Source
// ============================================================================

/// Polls a directory for new email-submission files.
#[derive(Debug, Clone)]
pub struct FileDropSource {
    /// Directory polled for new submissions.
    root: PathBuf,
}

impl FileDropSource {
    /// Creates a source rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when `root` does not exist or is not a
    /// directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let root = root.into();
        let metadata = fs::symlink_metadata(&root).map_err(|err| SourceError::Io(err.to_string()))?;
        if !metadata.is_dir() {
            return Err(SourceError::Io(format!("{} is not a directory", root.display())));
        }
        Ok(Self { root })
    }

    /// Returns the pending (not yet processed) entries in the drop directory,
    /// sorted by file name for deterministic ordering.
    fn pending_entries(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|err| SourceError::Io(err.to_string()))? {
            let entry = entry.map_err(|err| SourceError::Io(err.to_string()))?;
            let path = entry.path();
            if !is_pending_submission(&path) {
                continue;
            }
            entries.push(path);
        }
        entries.sort();
        Ok(entries)
    }
}

/// Returns true when `path` is a regular file not already marked processed.
fn is_pending_submission(path: &Path) -> bool {
    if path.extension().is_some_and(|ext| ext == "processed") {
        return false;
    }
    fs::symlink_metadata(path).map(|metadata| metadata.is_file()).unwrap_or(false)
}

impl ReporterSource for FileDropSource {
    fn channel(&self) -> SourceChannel {
        SourceChannel::Email
    }

    fn poll(&mut self) -> Result<Vec<RawTipInput>, SourceError> {
        let mut inputs = Vec::new();
        for path in self.pending_entries()? {
            let raw_content = fs::read_to_string(&path).map_err(|err| SourceError::Io(err.to_string()))?;
            let mut processed_path = path.clone().into_os_string();
            processed_path.push(PROCESSED_SUFFIX);
            fs::rename(&path, &processed_path).map_err(|err| SourceError::Io(err.to_string()))?;
            inputs.push(RawTipInput {
                source: SourceChannel::Email,
                raw_content,
                content_type: RawContentType::Email,
                received_at: None,
                metadata: None,
            });
        }
        Ok(inputs)
    }
}
