//! Catalog sync: configuration, orchestration and reporting

pub mod config;
pub mod report;
pub mod syncer;

pub use config::{SyncConfig, SyncJob};
pub use report::{run_failed, DocumentStatus, EntryReport, SyncReport, TrackUpdateOutcome};
pub use syncer::CatalogSyncer;
