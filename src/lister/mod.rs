//! Tracklist fetching
//!
//! Playlist contents come from an external tool through the [`TrackLister`]
//! trait. [`YtDlpLister`] shells out to yt-dlp; [`StubLister`] serves canned
//! answers for tests.

mod stub;
mod traits;
mod ytdlp;

pub use stub::StubLister;
pub use traits::TrackLister;
pub use ytdlp::{parse_titles, playlist_url, YtDlpLister, DEFAULT_MAX_OUTPUT, DEFAULT_TIMEOUT};
