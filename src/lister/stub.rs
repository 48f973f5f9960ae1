//! Stub lister with canned answers
//!
//! Serves fixed tracklists per playlist id without touching the network.
//! Unknown ids fail like an unavailable playlist would.

use super::traits::TrackLister;
use crate::error::FetchError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Canned {
    Tracks(Vec<String>),
    Timeout,
}

/// Stub lister that answers from a fixed table and records every call
#[derive(Debug, Default)]
pub struct StubLister {
    answers: HashMap<String, Canned>,
    calls: RefCell<Vec<String>>,
}

impl StubLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `playlist_id` with these titles
    pub fn with_tracks<S: Into<String>>(
        mut self,
        playlist_id: &str,
        titles: impl IntoIterator<Item = S>,
    ) -> Self {
        let titles = titles.into_iter().map(Into::into).collect();
        self.answers
            .insert(playlist_id.to_string(), Canned::Tracks(titles));
        self
    }

    /// Answer `playlist_id` with a timeout failure
    pub fn with_timeout(mut self, playlist_id: &str) -> Self {
        self.answers.insert(playlist_id.to_string(), Canned::Timeout);
        self
    }

    /// Playlist ids requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl TrackLister for StubLister {
    fn list_tracks(&self, playlist_id: &str) -> Result<Vec<String>, FetchError> {
        log::debug!("Stub fetch for: {}", playlist_id);
        self.calls.borrow_mut().push(playlist_id.to_string());

        match self.answers.get(playlist_id) {
            Some(Canned::Tracks(titles)) => Ok(titles.clone()),
            Some(Canned::Timeout) => Err(FetchError::Timeout(Duration::from_secs(120))),
            None => Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no canned tracklist for {}", playlist_id),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_answers_and_records() {
        let stub = StubLister::new()
            .with_tracks("PL1", ["a", "b"])
            .with_timeout("PL2");

        assert_eq!(stub.list_tracks("PL1").unwrap(), vec!["a", "b"]);
        assert!(matches!(stub.list_tracks("PL2"), Err(FetchError::Timeout(_))));
        assert!(stub.list_tracks("PL3").is_err());
        assert_eq!(stub.calls(), vec!["PL1", "PL2", "PL3"]);
    }
}
