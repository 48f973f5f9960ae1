//! Catalog document persistence
//!
//! Catalogs are stored as pretty-printed JSON (2-space indentation) with a
//! trailing newline. Object key order is preserved so unchanged data
//! rewrites to identical bytes.

use crate::error::CatalogError;
use crate::model::CatalogDocument;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

impl CatalogDocument {
    /// Read and classify a catalog document
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &content)
    }

    /// Parse catalog JSON; `path` is only used for error reporting
    pub fn parse(path: &Path, content: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        match value {
            Value::Object(fields) => Ok(Self::from_object(fields)),
            _ => Err(CatalogError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Render the document in its persisted form
    pub fn to_json_string(&self, path: &Path) -> Result<String, CatalogError> {
        let mut json = serde_json::to_string_pretty(&self.to_value()).map_err(|source| {
            CatalogError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        })?;
        json.push('\n');
        Ok(json)
    }

    /// Overwrite `path` with this document
    ///
    /// Written to a sibling temporary file first and renamed into place, so
    /// a failed write leaves the previous file intact. A symlinked `path`
    /// stays a symlink; its target is replaced. The previous file's
    /// permissions carry over.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let json = self.to_json_string(path)?;
        let target = resolve_target(path);
        let tmp_path = temp_path_for(&target);

        if let Err(source) = fs::write(&tmp_path, json.as_bytes()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(CatalogError::Io {
                path: tmp_path,
                source,
            });
        }

        if let Ok(metadata) = fs::metadata(&target) {
            if let Err(e) = fs::set_permissions(&tmp_path, metadata.permissions()) {
                log::warn!("Could not copy permissions of {:?}: {}", target, e);
            }
        }

        if let Err(source) = fs::rename(&tmp_path, &target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(CatalogError::Io {
                path: target,
                source,
            });
        }

        log::debug!("Wrote {} bytes to {:?}", json.len(), target);
        Ok(())
    }
}

/// The file a rename must replace: symlinks are followed to their target
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(resolved) => resolved,
            Err(e) => {
                log::warn!("Could not resolve symlink {:?}: {}", path, e);
                path.to_path_buf()
            }
        },
        _ => path.to_path_buf(),
    }
}

/// `playlists.json` -> `.playlists.json.tmp` in the same directory
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "quarterly": {
    "q1": {
      "id": "PL1",
      "name": "Q1 2024",
      "tracks": [
        "Café del Mar",
        "Song"
      ]
    }
  },
  "genres": {}
}
"#;

    #[test]
    fn test_load_save_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playlists.json");
        fs::write(&path, SAMPLE).unwrap();

        let doc = CatalogDocument::load(&path).unwrap();
        doc.save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
        assert!(!dir.path().join(".playlists.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = CatalogDocument::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_parse_errors() {
        let path = Path::new("broken.json");
        assert!(matches!(
            CatalogDocument::parse(path, "{ \"quarterly\": ").unwrap_err(),
            CatalogError::Parse { .. }
        ));
        assert!(matches!(
            CatalogDocument::parse(path, "[1, 2]").unwrap_err(),
            CatalogError::NotAnObject { .. }
        ));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let doc = CatalogDocument::parse(Path::new("x.json"), "{}").unwrap();
        let err = doc.save(&dir.path().join("nope").join("x.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_temp_write_error_names_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playlists.json");
        fs::write(&path, SAMPLE).unwrap();
        fs::create_dir(dir.path().join(".playlists.json.tmp")).unwrap();

        let doc = CatalogDocument::load(&path).unwrap();
        match doc.save(&path).unwrap_err() {
            CatalogError::Io { path: failed, .. } => {
                assert!(failed.ends_with(".playlists.json.tmp"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_through_symlink_updates_target() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("playlists.json");
        fs::write(&real, "{}").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let doc = CatalogDocument::parse(&link, SAMPLE).unwrap();
        doc.save(&link).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), SAMPLE);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playlists.json");
        fs::write(&path, SAMPLE).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        CatalogDocument::load(&path).unwrap().save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}
