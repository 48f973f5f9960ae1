use serde_json::{Map, Value};

/// Outcome of classifying a catalog object
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Fetchable playlist entry
    Playlist(PlaylistEntry),

    /// Playlist-shaped, but the id cannot be used for a fetch
    Unfetchable(Map<String, Value>),

    /// Not a playlist; a grouping of other nodes
    Group(Map<String, Value>),
}

/// JavaScript-style truthiness of a JSON value
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Titles as stored; non-string items are kept as their JSON text
fn track_titles(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| match item {
            Value::String(title) => title.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// A playlist entry in the catalog: an external playlist id plus its ordered titles
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    /// External playlist id (YouTube list id)
    pub id: String,

    /// Human label shown on the site, distinct from the catalog key
    pub name: Option<String>,

    /// Track titles in source order (duplicates allowed)
    pub tracks: Vec<String>,

    /// The original object, kept so unrelated fields and key order survive a rewrite
    fields: Map<String, Value>,
}

impl PlaylistEntry {
    /// Create a new entry with no extra fields
    pub fn new(id: impl Into<String>, tracks: Vec<String>) -> Self {
        let id = id.into();
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.clone()));
        fields.insert("tracks".to_string(), Value::Null);

        Self {
            id,
            name: None,
            tracks,
            fields,
        }
    }

    /// Set the human label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Classify a JSON object
    ///
    /// An object is playlist-shaped when its `id` is present and truthy
    /// (not null, `false`, `0` or `""`) and `tracks` is an array. String,
    /// numeric and `true` ids become fetchable entries; object and array ids
    /// cannot name a playlist and the object is kept verbatim.
    pub fn classify(fields: Map<String, Value>) -> Classification {
        let tracks_is_array = matches!(fields.get("tracks"), Some(Value::Array(_)));
        let id = match fields.get("id") {
            Some(id) if tracks_is_array && is_truthy(id) => id,
            _ => return Classification::Group(fields),
        };

        let id = match id {
            Value::String(id) => id.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(_) => "true".to_string(),
            _ => return Classification::Unfetchable(fields),
        };

        let tracks = match fields.get("tracks") {
            Some(Value::Array(items)) => track_titles(items),
            _ => Vec::new(),
        };

        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);

        Classification::Playlist(Self {
            id,
            name,
            tracks,
            fields,
        })
    }

    /// Convert back to a JSON object, keeping the original key order
    ///
    /// `id` is written back as it was read. A `tracks` array that was not
    /// replaced is written back verbatim, non-string items included.
    pub fn to_object(&self) -> Map<String, Value> {
        let mut fields = self.fields.clone();
        if let Some(ref name) = self.name {
            fields.insert("name".to_string(), Value::String(name.clone()));
        }

        let untouched = match fields.get("tracks") {
            Some(Value::Array(items)) => track_titles(items) == self.tracks,
            _ => false,
        };
        if !untouched {
            fields.insert(
                "tracks".to_string(),
                Value::Array(self.tracks.iter().cloned().map(Value::String).collect()),
            );
        }
        fields
    }

    /// Replace the track list wholesale
    pub fn replace_tracks(&mut self, tracks: Vec<String>) {
        self.tracks = tracks;
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the entry has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
