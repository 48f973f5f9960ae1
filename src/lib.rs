//! Playlist Sync - keeps a JSON playlist catalog in step with YouTube
//!
//! This library refreshes the tracklists of a nested playlist catalog by
//! asking yt-dlp for the current titles of every playlist, and provides
//! the listening stats counters used by the site.

pub mod catalog;
pub mod error;
pub mod lister;
pub mod model;
pub mod stats;
pub mod sync;

pub use error::{CatalogError, FetchError, StatsError};
pub use model::{CatalogDocument, CatalogNode, PlaylistEntry};
pub use sync::{run_failed, CatalogSyncer, SyncConfig, SyncJob, SyncReport, TrackUpdateOutcome};
