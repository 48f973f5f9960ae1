use super::playlist::Classification;
use super::PlaylistEntry;
use serde_json::{Map, Value};

/// A node of the catalog tree, classified once when the document is parsed
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogNode {
    /// Object with a truthy `id` and a `tracks` list
    Playlist(PlaylistEntry),

    /// Playlist-shaped object whose `id` is an object or array; never fetched
    /// or descended into
    Unfetchable(Map<String, Value>),

    /// Any other object; children in document order
    Group(Vec<(String, CatalogNode)>),

    /// Non-object value, carried through verbatim
    Value(Value),
}

impl CatalogNode {
    /// Classify a JSON value (recursively)
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => match PlaylistEntry::classify(fields) {
                Classification::Playlist(entry) => CatalogNode::Playlist(entry),
                Classification::Unfetchable(fields) => CatalogNode::Unfetchable(fields),
                Classification::Group(fields) => CatalogNode::Group(children_from_object(fields)),
            },
            other => CatalogNode::Value(other),
        }
    }

    /// Convert back to JSON
    pub fn to_value(&self) -> Value {
        match self {
            CatalogNode::Playlist(entry) => Value::Object(entry.to_object()),
            CatalogNode::Group(children) => Value::Object(children_to_object(children)),
            CatalogNode::Unfetchable(fields) => Value::Object(fields.clone()),
            CatalogNode::Value(value) => value.clone(),
        }
    }
}

fn children_from_object(fields: Map<String, Value>) -> Vec<(String, CatalogNode)> {
    fields
        .into_iter()
        .map(|(key, value)| (key, CatalogNode::from_value(value)))
        .collect()
}

fn children_to_object(children: &[(String, CatalogNode)]) -> Map<String, Value> {
    children
        .iter()
        .map(|(key, node)| (key.clone(), node.to_value()))
        .collect()
}

/// A whole catalog document (top level is always an object)
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogDocument {
    roots: Vec<(String, CatalogNode)>,
}

impl CatalogDocument {
    /// Build a document from a top-level JSON object
    pub fn from_object(fields: Map<String, Value>) -> Self {
        Self {
            roots: children_from_object(fields),
        }
    }

    /// Convert back to a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(children_to_object(&self.roots))
    }

    /// Look up a top-level node by key
    pub fn root(&self, key: &str) -> Option<&CatalogNode> {
        self.roots.iter().find(|(k, _)| k == key).map(|(_, node)| node)
    }

    /// Check whether a top-level key exists
    pub fn has_root(&self, key: &str) -> bool {
        self.root(key).is_some()
    }

    /// Positions of the given root keys, in the order given, each at most once
    fn root_indices(&self, root_keys: &[String]) -> Vec<usize> {
        let mut indices = Vec::new();
        for key in root_keys {
            if let Some(idx) = self.roots.iter().position(|(k, _)| k == key) {
                if !indices.contains(&idx) {
                    indices.push(idx);
                }
            }
        }
        indices
    }

    /// Iterate playlist entries under the given root keys
    ///
    /// Depth-first, children in document order, roots in the order given.
    /// Yields `(dotted path, entry)`.
    pub fn entries<'a>(&'a self, root_keys: &[String]) -> Entries<'a> {
        let mut stack = Vec::new();
        for idx in self.root_indices(root_keys).into_iter().rev() {
            let (key, node) = &self.roots[idx];
            match node {
                CatalogNode::Group(children) => stack.push((key.clone(), children.iter())),
                _ => log::debug!("Root '{}' is not a group, skipping", key),
            }
        }
        Entries { stack }
    }

    /// Dotted paths of playlist-shaped objects under the given roots whose
    /// id cannot be fetched, in traversal order
    pub fn unfetchable(&self, root_keys: &[String]) -> Vec<String> {
        fn walk(prefix: &str, children: &[(String, CatalogNode)], out: &mut Vec<String>) {
            for (key, node) in children {
                match node {
                    CatalogNode::Unfetchable(_) => out.push(join_path(prefix, key)),
                    CatalogNode::Group(grandchildren) => {
                        walk(&join_path(prefix, key), grandchildren, out)
                    }
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        for idx in self.root_indices(root_keys) {
            if let (key, CatalogNode::Group(children)) = &self.roots[idx] {
                walk(key, children, &mut out);
            }
        }
        out
    }

    /// Mutable variant of [`CatalogDocument::entries`]
    pub fn entries_mut<'a>(&'a mut self, root_keys: &[String]) -> EntriesMut<'a> {
        let indices = self.root_indices(root_keys);
        let mut slots: Vec<Option<&'a mut (String, CatalogNode)>> =
            self.roots.iter_mut().map(Some).collect();

        let mut stack = Vec::new();
        for idx in indices.into_iter().rev() {
            let Some((key, node)) = slots[idx].take() else {
                continue;
            };
            match node {
                CatalogNode::Group(children) => stack.push((key.clone(), children.iter_mut())),
                _ => log::debug!("Root '{}' is not a group, skipping", key),
            }
        }
        EntriesMut { stack }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    format!("{}.{}", prefix, key)
}

/// Lazy iterator over playlist entries
pub struct Entries<'a> {
    stack: Vec<(String, std::slice::Iter<'a, (String, CatalogNode)>)>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (String, &'a PlaylistEntry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = {
                let (prefix, children) = self.stack.last_mut()?;
                children
                    .next()
                    .map(|(key, node)| (join_path(prefix, key), node))
            };

            match next {
                None => {
                    self.stack.pop();
                }
                Some((path, CatalogNode::Playlist(entry))) => return Some((path, entry)),
                Some((path, CatalogNode::Group(children))) => {
                    self.stack.push((path, children.iter()));
                }
                Some((_, CatalogNode::Unfetchable(_) | CatalogNode::Value(_))) => {}
            }
        }
    }
}

/// Lazy iterator over playlist entries, with mutable access
pub struct EntriesMut<'a> {
    stack: Vec<(String, std::slice::IterMut<'a, (String, CatalogNode)>)>,
}

impl<'a> Iterator for EntriesMut<'a> {
    type Item = (String, &'a mut PlaylistEntry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = {
                let (prefix, children) = self.stack.last_mut()?;
                children
                    .next()
                    .map(|(key, node)| (join_path(prefix, key), node))
            };

            match next {
                None => {
                    self.stack.pop();
                }
                Some((path, CatalogNode::Playlist(entry))) => return Some((path, entry)),
                Some((path, CatalogNode::Group(children))) => {
                    self.stack.push((path, children.iter_mut()));
                }
                Some((_, CatalogNode::Unfetchable(_) | CatalogNode::Value(_))) => {}
            }
        }
    }
}
