//! Catalog data model
//!
//! A catalog document is a JSON tree. Nodes are classified once at parse
//! time into playlist entries, unfetchable entries, groups and plain values.

mod catalog;
mod playlist;

pub use catalog::{CatalogDocument, CatalogNode, Entries, EntriesMut};
pub use playlist::{Classification, PlaylistEntry};
