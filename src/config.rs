//! Store configuration.
//!
//! The engine owns its configuration for its whole lifetime; there is no
//! process-wide data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{Error, FeedId, Result};

/// Configuration for a [`FeedStore`](crate::FeedStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one data file per feed.
    /// Default: /var/lib/phptimeseries/
    pub data_dir: PathBuf,

    /// Data file extension, without the dot.
    /// Default: MYD
    pub extension: String,

    /// Upper bound on points produced by interval sampling.
    /// Default: 3000
    pub max_sample_points: u64,

    /// Chunk size for raw exports, in bytes.
    /// Default: 8192
    pub export_chunk_size: usize,

    /// Safety bound on calendar-day sampling steps.
    /// Default: 10000
    pub max_daily_iterations: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/phptimeseries/"),
            extension: "MYD".to_string(),
            max_sample_points: 3000,
            export_chunk_size: 8192,
            max_daily_iterations: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config: StoreConfig = serde_json::from_slice(&data)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.contains(['/', '.']) {
            return Err(Error::Config(format!(
                "extension {:?} must be a bare file extension",
                self.extension
            )));
        }
        if self.export_chunk_size == 0 {
            return Err(Error::Config("export_chunk_size must be positive".into()));
        }
        Ok(())
    }

    /// `<data_dir>/feed_<id>.<extension>`
    pub fn feed_path(&self, id: FeedId) -> PathBuf {
        self.data_dir.join(format!("feed_{id}.{}", self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.extension, "MYD");
        assert_eq!(config.max_sample_points, 3000);
        assert_eq!(config.export_chunk_size, 8192);
        assert_eq!(config.max_daily_iterations, 10_000);
    }

    #[test]
    fn test_feed_path_naming() {
        let config = StoreConfig::new("/data/ts");
        assert_eq!(config.feed_path(42), PathBuf::from("/data/ts/feed_42.MYD"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "data_dir": "/srv/feeds", "max_sample_points": 500 }"#;
        let config: StoreConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/feeds"));
        assert_eq!(config.max_sample_points, 500);
        assert_eq!(config.extension, "MYD");
    }

    #[test]
    fn test_load_rejects_bad_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{ "extension": "a/b" }"#).unwrap();
        assert!(matches!(StoreConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = StoreConfig::new("/tmp/feeds");
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
