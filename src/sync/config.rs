//! Sync configuration

use std::path::{Path, PathBuf};

/// Root keys synced by default
pub const DEFAULT_ROOT_KEYS: [&str; 2] = ["quarterly", "genres"];

/// Catalog file name inside the data directory
pub const DEFAULT_CATALOG: &str = "playlists.json";

/// One catalog document to sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    /// Catalog file, read and rewritten in place
    pub path: PathBuf,

    /// Top-level keys whose subtrees are walked
    pub root_keys: Vec<String>,

    /// A load failure of a required job fails the whole run
    pub required: bool,
}

impl SyncJob {
    /// Create an optional job with the default root keys
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            root_keys: DEFAULT_ROOT_KEYS.iter().map(|k| k.to_string()).collect(),
            required: false,
        }
    }

    /// Replace the root keys
    pub fn with_root_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.root_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the job as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Configuration for a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Jobs, processed in order
    pub jobs: Vec<SyncJob>,
}

impl SyncConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// The fixed default: `<data_dir>/playlists.json`, required, default roots
    pub fn default_for(data_dir: &Path) -> Self {
        Self::new().with_job(SyncJob::new(data_dir.join(DEFAULT_CATALOG)).required())
    }

    /// Append a job
    pub fn with_job(mut self, job: SyncJob) -> Self {
        self.jobs.push(job);
        self
    }

    /// Replace the root keys of every job
    pub fn with_root_keys(mut self, keys: &[String]) -> Self {
        for job in &mut self.jobs {
            job.root_keys = keys.to_vec();
        }
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::default_for(Path::new("data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();

        assert_eq!(config.jobs.len(), 1);
        let job = &config.jobs[0];
        assert_eq!(job.path, PathBuf::from("data/playlists.json"));
        assert_eq!(job.root_keys, vec!["quarterly", "genres"]);
        assert!(job.required);
    }

    #[test]
    fn test_override_root_keys() {
        let config = SyncConfig::default()
            .with_job(SyncJob::new("extra.json"))
            .with_root_keys(&["mixes".to_string()]);

        assert!(config.jobs.iter().all(|j| j.root_keys == vec!["mixes"]));
        assert!(!config.jobs[1].required);
    }
}
