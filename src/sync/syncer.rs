//! Catalog sync orchestration

use super::config::{SyncConfig, SyncJob};
use super::report::{DocumentStatus, EntryReport, SyncReport, TrackUpdateOutcome};
use crate::lister::TrackLister;
use crate::model::{CatalogDocument, PlaylistEntry};

/// Refreshes playlist tracklists in catalog documents
pub struct CatalogSyncer<L: TrackLister> {
    lister: L,
}

impl<L: TrackLister> CatalogSyncer<L> {
    /// Create a new syncer
    pub fn new(lister: L) -> Self {
        Self { lister }
    }

    /// Access the underlying lister
    pub fn lister(&self) -> &L {
        &self.lister
    }

    /// Run every job of a configuration
    pub fn run(&self, config: &SyncConfig) -> Vec<SyncReport> {
        self.sync_all(&config.jobs)
    }

    /// Sync each job in order; a failing job never stops the next one
    pub fn sync_all(&self, jobs: &[SyncJob]) -> Vec<SyncReport> {
        jobs.iter().map(|job| self.sync_document(job)).collect()
    }

    /// Load, refresh every entry under the configured roots, write back
    ///
    /// The document is written whenever it loaded, even if every fetch failed;
    /// failed and empty fetches keep the previous tracks.
    pub fn sync_document(&self, job: &SyncJob) -> SyncReport {
        let mut report = SyncReport::new(job.path.clone(), job.required);

        log::info!("Reading: {:?}", job.path);
        let mut document = match CatalogDocument::load(&job.path) {
            Ok(document) => document,
            Err(e) => {
                log::error!("Error reading {:?}: {}", job.path, e);
                report.status = DocumentStatus::LoadFailed(e);
                return report;
            }
        };

        for key in &job.root_keys {
            if !document.has_root(key) {
                log::warn!("Root '{}' not found in {:?}", key, job.path);
                report.missing_roots.push(key.clone());
            }
        }

        for path in document.unfetchable(&job.root_keys) {
            log::warn!("Skipping {}: id is not a usable playlist id", path);
            report.skipped.push(path);
        }

        for (path, entry) in document.entries_mut(&job.root_keys) {
            log::info!("Processing: {}", path);
            let outcome = self.refresh_entry(entry);
            report.entries.push(EntryReport {
                path,
                id: entry.id.clone(),
                outcome,
            });
        }

        log::info!("Writing updated {:?}...", job.path);
        match document.save(&job.path) {
            Ok(()) => log::info!("Done!"),
            Err(e) => {
                log::error!("Error writing {:?}: {}", job.path, e);
                report.status = DocumentStatus::PersistFailed(e);
            }
        }

        report
    }

    /// Fetch fresh tracks for one entry and apply the update policy
    pub fn refresh_entry(&self, entry: &mut PlaylistEntry) -> TrackUpdateOutcome {
        // The label is re-asserted from what we knew before the fetch
        let label = entry.name.clone();

        let titles = match self.lister.list_tracks(&entry.id) {
            Ok(titles) => titles,
            Err(e) => {
                log::error!("  Error fetching playlist {}: {}", entry.id, e);
                log::info!("  Keeping existing {} tracks (fetch failed)", entry.len());
                return TrackUpdateOutcome::Unchanged(e);
            }
        };

        if titles.is_empty() {
            log::warn!("  Warning: Playlist appears empty, keeping existing tracks");
            return TrackUpdateOutcome::EmptyResult;
        }

        let previous = entry.len();
        entry.replace_tracks(titles);
        entry.name = label;
        let current = entry.len();

        if current != previous {
            log::info!("  Updated: {} -> {} tracks", previous, current);
        } else {
            log::info!("  Track count unchanged: {}", current);
        }

        TrackUpdateOutcome::Updated { previous, current }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::StubLister;

    #[test]
    fn test_refresh_replaces_tracks() {
        let syncer = CatalogSyncer::new(StubLister::new().with_tracks("PL1", ["X"]));
        let mut entry = PlaylistEntry::new("PL1", vec!["A".into(), "B".into()]).with_name("Mix");

        let outcome = syncer.refresh_entry(&mut entry);

        assert!(matches!(
            outcome,
            TrackUpdateOutcome::Updated {
                previous: 2,
                current: 1
            }
        ));
        assert_eq!(entry.tracks, vec!["X"]);
        assert_eq!(entry.name.as_deref(), Some("Mix"));
    }

    #[test]
    fn test_refresh_keeps_duplicates() {
        let syncer = CatalogSyncer::new(StubLister::new().with_tracks("PL1", ["a", "b", "a"]));
        let mut entry = PlaylistEntry::new("PL1", Vec::new());

        syncer.refresh_entry(&mut entry);

        assert_eq!(entry.tracks, vec!["a", "b", "a"]);
        assert!(entry.name.is_none());
    }

    #[test]
    fn test_refresh_empty_result_keeps_tracks() {
        let syncer = CatalogSyncer::new(StubLister::new().with_tracks("PL1", Vec::<String>::new()));
        let mut entry = PlaylistEntry::new("PL1", vec!["keep".into()]);

        let outcome = syncer.refresh_entry(&mut entry);

        assert!(outcome.is_empty_result());
        assert!(!outcome.is_failure());
        assert_eq!(entry.tracks, vec!["keep"]);
    }

    #[test]
    fn test_refresh_failure_keeps_tracks() {
        let syncer = CatalogSyncer::new(StubLister::new().with_timeout("PL1"));
        let mut entry = PlaylistEntry::new("PL1", vec!["b".into(), "a".into()]);

        let outcome = syncer.refresh_entry(&mut entry);

        assert!(outcome.is_failure());
        assert_eq!(entry.tracks, vec!["b", "a"]);
    }
}
