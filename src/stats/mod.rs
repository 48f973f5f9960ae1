//! Listening stats
//!
//! Site counters kept in a realtime database: visitors (once per session),
//! total plays and per-playlist plays. The database and the page are
//! reached through [`CounterStore`] and [`StatsDisplay`].

mod store;
mod tracker;

pub use store::{split_path, CounterStore, Listener, MemoryCounterStore};
pub use tracker::{
    format_count, sanitize_key, top_playlists, PlaylistPlays, RankedPlaylist, Session,
    StatsDisplay, StatsTracker, PLAYLISTS_PATH, TOP_PLAYLISTS_ELEMENT, TOP_PLAYLISTS_LIMIT,
    TOTAL_PLAYS_ELEMENT, TOTAL_PLAYS_PATH, VISITED_FLAG, VISITORS_PATH,
};
