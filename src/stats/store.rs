//! Counter store abstraction and an in-memory implementation

use crate::error::StatsError;
use serde_json::{Map, Value};
use std::cell::RefCell;

/// Callback invoked with the current value at a subscribed path
pub type Listener = Box<dyn Fn(Option<&Value>)>;

/// A realtime key/value store with an atomic read-modify-write primitive
pub trait CounterStore {
    /// Atomically replace the value at `path` with `update(current)`
    ///
    /// Returns the committed value.
    fn transaction(
        &self,
        path: &str,
        update: &mut dyn FnMut(Option<Value>) -> Value,
    ) -> Result<Value, StatsError>;

    /// Current value at `path`
    fn get(&self, path: &str) -> Result<Option<Value>, StatsError>;

    /// Call `listener` now and after every change at, above or below `path`
    fn subscribe(&self, path: &str, listener: Listener) -> Result<(), StatsError>;
}

/// Split a `/`-separated path, rejecting empty segments and reserved characters
pub fn split_path(path: &str) -> Result<Vec<&str>, StatsError> {
    let segments: Vec<&str> = path.split('/').collect();
    let valid = segments
        .iter()
        .all(|s| !s.is_empty() && !s.contains(['.', '#', '$', '[', ']']));
    if !valid {
        return Err(StatsError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Paths overlap when one is a prefix of the other
fn overlaps(a: &[&str], b: &[String]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| *x == y.as_str())
}

/// Single-process store backed by a JSON tree
pub struct MemoryCounterStore {
    data: RefCell<Value>,
    listeners: RefCell<Vec<(Vec<String>, Listener)>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(Value::Object(Map::new())),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Snapshot of the whole tree
    pub fn snapshot(&self) -> Value {
        self.data.borrow().clone()
    }

    fn lookup(&self, segments: &[&str]) -> Option<Value> {
        let data = self.data.borrow();
        let mut node = &*data;
        for segment in segments {
            node = node.get(*segment)?;
        }
        if node.is_null() {
            None
        } else {
            Some(node.clone())
        }
    }

    fn write(&self, segments: &[&str], value: Value) {
        let mut data = self.data.borrow_mut();
        let mut node = &mut *data;
        for segment in segments {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            // Just ensured it is an object
            let Value::Object(map) = node else { return };
            node = map.entry(segment.to_string()).or_insert(Value::Null);
        }
        *node = value;
    }

    fn notify(&self, changed: &[&str]) {
        let listeners = self.listeners.borrow();
        for (path, listener) in listeners.iter() {
            if overlaps(changed, path) {
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                listener(self.lookup(&segments).as_ref());
            }
        }
    }
}

impl Default for MemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore for MemoryCounterStore {
    fn transaction(
        &self,
        path: &str,
        update: &mut dyn FnMut(Option<Value>) -> Value,
    ) -> Result<Value, StatsError> {
        let segments = split_path(path)?;
        let next = update(self.lookup(&segments));
        self.write(&segments, next.clone());
        self.notify(&segments);
        Ok(next)
    }

    fn get(&self, path: &str) -> Result<Option<Value>, StatsError> {
        let segments = split_path(path)?;
        Ok(self.lookup(&segments))
    }

    fn subscribe(&self, path: &str, listener: Listener) -> Result<(), StatsError> {
        let segments = split_path(path)?;
        listener(self.lookup(&segments).as_ref());
        self.listeners.borrow_mut().push((
            segments.into_iter().map(str::to_string).collect(),
            listener,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::rc::Rc;

    fn increment(store: &MemoryCounterStore, path: &str) -> Value {
        store
            .transaction(path, &mut |current: Option<Value>| {
                json!(current.and_then(|v| v.as_u64()).unwrap_or(0) + 1)
            })
            .unwrap()
    }

    #[test]
    fn test_transaction_creates_and_increments() {
        let store = MemoryCounterStore::new();

        assert_eq!(increment(&store, "stats/visitors"), json!(1));
        assert_eq!(increment(&store, "stats/visitors"), json!(2));
        assert_eq!(store.snapshot(), json!({ "stats": { "visitors": 2 } }));
    }

    #[test]
    fn test_invalid_paths() {
        let store = MemoryCounterStore::new();
        assert!(store.get("stats//x").is_err());
        assert!(store.get("stats/a.b").is_err());
        assert!(store.get("stats/[x]").is_err());
    }

    #[test]
    fn test_subscribers_see_related_changes_only() {
        let store = MemoryCounterStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        store
            .subscribe(
                "stats/playlists",
                Box::new(move |value: Option<&Value>| {
                    sink.borrow_mut().push(value.cloned());
                }),
            )
            .unwrap();

        increment(&store, "stats/playlists/a");
        increment(&store, "stats/visitors");

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], None);
        assert_eq!(seen[1], Some(json!({ "a": 1 })));
    }
}
