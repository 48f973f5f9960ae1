//! Track lister trait definition

use crate::error::FetchError;

/// Source of playlist tracklists - allows swapping the real tool for a stub
pub trait TrackLister {
    /// Fetch the current ordered titles of a playlist
    ///
    /// Unavailable individual items are skipped by the implementation; only a
    /// failure of the whole call is reported as an error.
    fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>, FetchError>;
}

impl<L: TrackLister + ?Sized> TrackLister for &L {
    fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        (**self).list_tracks(playlist_id)
    }
}

impl<L: TrackLister + ?Sized> TrackLister for Box<L> {
    fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        (**self).list_tracks(playlist_id)
    }
}
