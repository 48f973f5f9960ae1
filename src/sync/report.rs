//! Per-entry outcomes and per-document reports

use crate::error::{CatalogError, FetchError};
use std::path::PathBuf;

/// Result of refreshing one playlist entry
#[derive(Debug)]
pub enum TrackUpdateOutcome {
    /// Tracks replaced with a fresh list
    Updated { previous: usize, current: usize },

    /// Fetch succeeded with no titles; existing tracks kept
    EmptyResult,

    /// Fetch failed; existing tracks kept
    Unchanged(FetchError),
}

impl TrackUpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, TrackUpdateOutcome::Updated { .. })
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, TrackUpdateOutcome::EmptyResult)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TrackUpdateOutcome::Unchanged(_))
    }
}

/// Outcome for one entry, with where it lives in the document
#[derive(Debug)]
pub struct EntryReport {
    /// Dotted path, e.g. `quarterly.q1`
    pub path: String,
    pub id: String,
    pub outcome: TrackUpdateOutcome,
}

/// What happened to the document as a whole
#[derive(Debug)]
pub enum DocumentStatus {
    /// Loaded and written back
    Synced,

    /// Could not be read or parsed; nothing was fetched or written
    LoadFailed(CatalogError),

    /// Entries were processed but the write failed
    PersistFailed(CatalogError),
}

/// Report for one sync job
#[derive(Debug)]
pub struct SyncReport {
    pub path: PathBuf,
    pub required: bool,
    pub status: DocumentStatus,
    /// Configured root keys absent from the document
    pub missing_roots: Vec<String>,
    /// Playlist-shaped objects left alone because their id is unusable
    pub skipped: Vec<String>,
    pub entries: Vec<EntryReport>,
}

impl SyncReport {
    pub(crate) fn new(path: PathBuf, required: bool) -> Self {
        Self {
            path,
            required,
            status: DocumentStatus::Synced,
            missing_roots: Vec::new(),
            skipped: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn updated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_updated()).count()
    }

    pub fn empty_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_empty_result())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    /// The document could not be loaded
    pub fn load_failed(&self) -> bool {
        matches!(self.status, DocumentStatus::LoadFailed(_))
    }

    /// The document was loaded but could not be written back
    pub fn persist_failed(&self) -> bool {
        matches!(self.status, DocumentStatus::PersistFailed(_))
    }

    /// The document was loaded and written back
    pub fn is_synced(&self) -> bool {
        matches!(self.status, DocumentStatus::Synced)
    }

    /// Log a one-line summary
    pub fn log_summary(&self) {
        match &self.status {
            DocumentStatus::Synced => log::info!(
                "{:?}: {} entries, {} updated, {} empty, {} failed, {} skipped",
                self.path,
                self.entries.len(),
                self.updated_count(),
                self.empty_count(),
                self.failed_count(),
                self.skipped.len()
            ),
            DocumentStatus::LoadFailed(e) => log::error!("{:?}: not synced: {}", self.path, e),
            DocumentStatus::PersistFailed(e) => log::error!(
                "{:?}: {} entries processed but not written: {}",
                self.path,
                self.entries.len(),
                e
            ),
        }
    }
}

/// Whether a run should end with a failing exit status
///
/// True when a required document could not be loaded or could not be
/// written back. Optional documents and per-entry fetch failures never fail
/// the run.
pub fn run_failed(reports: &[SyncReport]) -> bool {
    reports
        .iter()
        .any(|r| r.required && (r.load_failed() || r.persist_failed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(required: bool, status: DocumentStatus) -> SyncReport {
        let mut report = SyncReport::new(PathBuf::from("playlists.json"), required);
        report.status = status;
        report
    }

    fn catalog_error() -> CatalogError {
        CatalogError::NotAnObject {
            path: PathBuf::from("playlists.json"),
        }
    }

    #[test]
    fn test_run_failed_on_required_load_failure() {
        let reports = vec![report(true, DocumentStatus::LoadFailed(catalog_error()))];
        assert!(run_failed(&reports));
    }

    #[test]
    fn test_run_failed_on_required_persist_failure() {
        let reports = vec![
            report(true, DocumentStatus::PersistFailed(catalog_error())),
            report(false, DocumentStatus::Synced),
        ];
        assert!(run_failed(&reports));
    }

    #[test]
    fn test_run_succeeds_when_only_optional_documents_fail() {
        let reports = vec![
            report(true, DocumentStatus::Synced),
            report(false, DocumentStatus::LoadFailed(catalog_error())),
            report(false, DocumentStatus::PersistFailed(catalog_error())),
        ];
        assert!(!run_failed(&reports));
        assert!(!run_failed(&[]));
    }
}
