//! Visitor and play counters

use super::store::CounterStore;
use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::rc::Rc;

pub const VISITORS_PATH: &str = "stats/visitors";
pub const TOTAL_PLAYS_PATH: &str = "stats/total_plays";
pub const PLAYLISTS_PATH: &str = "stats/playlists";

/// Session flag set once the visitor counter has been bumped
pub const VISITED_FLAG: &str = "rtc_visited";

pub const TOTAL_PLAYS_ELEMENT: &str = "total-plays-count";
pub const TOP_PLAYLISTS_ELEMENT: &str = "top-playlists-list";
pub const TOP_PLAYLISTS_LIMIT: usize = 3;

/// Page elements the counters are rendered into
pub trait StatsDisplay {
    /// Replace the text of an element
    fn set_text(&self, element_id: &str, text: &str);

    /// Replace a ranked list (most played first)
    fn set_ranking(&self, element_id: &str, items: &[RankedPlaylist]);
}

/// Stored per-playlist play record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPlays {
    pub name: String,
    #[serde(default)]
    pub plays: u64,
}

/// One row of the top playlists list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlaylist {
    /// 1-based
    pub rank: usize,
    pub name: String,
    pub plays: u64,
}

/// Session-scoped flags (lives as long as one browsing session)
#[derive(Debug, Default, Clone)]
pub struct Session {
    flags: HashSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn set(&mut self, flag: &str) {
        self.flags.insert(flag.to_string());
    }
}

/// Replace characters not allowed in store keys (`. # $ [ ]`) with `_`
pub fn sanitize_key(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | '#' | '$' | '[' | ']' => '_',
            c => c,
        })
        .collect()
}

/// Render a count with thousands separators
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn as_count(value: Option<&Value>) -> u64 {
    value.and_then(Value::as_u64).unwrap_or(0)
}

fn increment(current: Option<Value>) -> Value {
    Value::from(as_count(current.as_ref()) + 1)
}

/// Most played first, at most `limit` rows
///
/// Rows come out as a store ordered ascending by plays then key, read back to
/// front, so equal counts appear in descending key order.
pub fn top_playlists(playlists: Option<&Value>, limit: usize) -> Vec<RankedPlaylist> {
    let Some(Value::Object(children)) = playlists else {
        return Vec::new();
    };

    let mut records: Vec<(&String, PlaylistPlays)> = children
        .iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<PlaylistPlays>(value.clone())
                .ok()
                .map(|record| (key, record))
        })
        .collect();
    records.sort_by(|(ka, a), (kb, b)| b.plays.cmp(&a.plays).then_with(|| kb.cmp(ka)));

    records
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (_, record))| RankedPlaylist {
            rank: i + 1,
            name: record.name,
            plays: record.plays,
        })
        .collect()
}

/// Counter operations for the site
pub struct StatsTracker<S: CounterStore, D: StatsDisplay + 'static> {
    store: S,
    display: Rc<D>,
}

impl<S: CounterStore, D: StatsDisplay + 'static> StatsTracker<S, D> {
    pub fn new(store: S, display: D) -> Self {
        Self {
            store,
            display: Rc::new(display),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn render_count(&self, path: &str, element_id: &str) -> Result<(), StatsError> {
        let display = Rc::clone(&self.display);
        let element_id = element_id.to_string();
        self.store.subscribe(
            path,
            Box::new(move |value: Option<&Value>| {
                display.set_text(&element_id, &format_count(as_count(value)))
            }),
        )
    }

    /// Show the visitor count in `element_id` and count this session once
    pub fn init_visitor_counter(
        &self,
        session: &mut Session,
        element_id: &str,
    ) -> Result<(), StatsError> {
        self.render_count(VISITORS_PATH, element_id)?;

        if !session.is_set(VISITED_FLAG) {
            self.store.transaction(VISITORS_PATH, &mut increment)?;
            session.set(VISITED_FLAG);
            log::debug!("Counted new visitor session");
        }
        Ok(())
    }

    /// Count one play of `playlist_name`
    ///
    /// Bumps the global play counter and the playlist's own record. Empty
    /// names are ignored.
    pub fn track_play(&self, playlist_name: &str) -> Result<(), StatsError> {
        if playlist_name.is_empty() {
            return Ok(());
        }

        self.store.transaction(TOTAL_PLAYS_PATH, &mut increment)?;

        let path = format!("{}/{}", PLAYLISTS_PATH, sanitize_key(playlist_name));
        self.store.transaction(&path, &mut |current: Option<Value>| match current {
            Some(Value::Object(mut record)) => {
                let plays = as_count(record.get("plays")) + 1;
                record.insert("plays".to_string(), Value::from(plays));
                record.insert("name".to_string(), Value::from(playlist_name));
                Value::Object(record)
            }
            _ => serde_json::json!({ "name": playlist_name, "plays": 1 }),
        })?;

        log::debug!("Counted play of {}", playlist_name);
        Ok(())
    }

    /// Keep the total plays and top playlists elements up to date
    pub fn init_music_stats(&self) -> Result<(), StatsError> {
        self.render_count(TOTAL_PLAYS_PATH, TOTAL_PLAYS_ELEMENT)?;

        let display = Rc::clone(&self.display);
        self.store.subscribe(
            PLAYLISTS_PATH,
            Box::new(move |value: Option<&Value>| {
                let ranking = top_playlists(value, TOP_PLAYLISTS_LIMIT);
                display.set_ranking(TOP_PLAYLISTS_ELEMENT, &ranking)
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::MemoryCounterStore;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakePage {
        text: RefCell<HashMap<String, String>>,
        rankings: RefCell<HashMap<String, Vec<RankedPlaylist>>>,
    }

    impl StatsDisplay for FakePage {
        fn set_text(&self, element_id: &str, text: &str) {
            self.text
                .borrow_mut()
                .insert(element_id.to_string(), text.to_string());
        }

        fn set_ranking(&self, element_id: &str, items: &[RankedPlaylist]) {
            self.rankings
                .borrow_mut()
                .insert(element_id.to_string(), items.to_vec());
        }
    }

    fn tracker() -> StatsTracker<MemoryCounterStore, FakePage> {
        StatsTracker::new(MemoryCounterStore::new(), FakePage::default())
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("Q1.2024 #1 [$mix]"), "Q1_2024 _1 __mix_");
        assert_eq!(sanitize_key("Deep House"), "Deep House");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_visitor_counted_once_per_session() {
        let stats = tracker();
        let mut session = Session::new();

        stats.init_visitor_counter(&mut session, "visitors").unwrap();
        stats.init_visitor_counter(&mut session, "visitors").unwrap();
        assert_eq!(stats.store().get(VISITORS_PATH).unwrap(), Some(json!(1)));

        let mut other = Session::new();
        stats.init_visitor_counter(&mut other, "visitors").unwrap();
        assert_eq!(stats.store().get(VISITORS_PATH).unwrap(), Some(json!(2)));
        assert_eq!(stats.display().text.borrow()["visitors"], "2");
    }

    #[test]
    fn test_track_play_records_name_and_count() {
        let stats = tracker();

        stats.track_play("Q1.2024").unwrap();
        stats.track_play("Q1.2024").unwrap();
        stats.track_play("").unwrap();

        assert_eq!(stats.store().get(TOTAL_PLAYS_PATH).unwrap(), Some(json!(2)));
        assert_eq!(
            stats.store().get("stats/playlists/Q1_2024").unwrap(),
            Some(json!({ "name": "Q1.2024", "plays": 2 }))
        );
    }

    #[test]
    fn test_music_stats_show_top_three() {
        let stats = tracker();
        stats.init_music_stats().unwrap();

        for (name, plays) in [("a", 1), ("b", 4), ("c", 2), ("d", 3)] {
            for _ in 0..plays {
                stats.track_play(name).unwrap();
            }
        }

        let page = stats.display();
        assert_eq!(page.text.borrow()[TOTAL_PLAYS_ELEMENT], "10");

        let ranking = page.rankings.borrow()[TOP_PLAYLISTS_ELEMENT].clone();
        let names: Vec<(usize, &str, u64)> = ranking
            .iter()
            .map(|r| (r.rank, r.name.as_str(), r.plays))
            .collect();
        assert_eq!(names, vec![(1, "b", 4), (2, "d", 3), (3, "c", 2)]);
    }

    #[test]
    fn test_top_playlists_ties_in_descending_key_order() {
        let stats = tracker();
        stats.init_music_stats().unwrap();

        for name in ["a", "b", "c", "d"] {
            stats.track_play(name).unwrap();
        }

        let page = stats.display();
        let ranking = page.rankings.borrow()[TOP_PLAYLISTS_ELEMENT].clone();
        let names: Vec<&str> = ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["d", "c", "b"]);
    }
}
