//! Feed lifecycle: one data file per feed under the configured directory.

mod write;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::config::StoreConfig;
use crate::core::file::{record_count, FeedFile};
use crate::core::record::{Record, RECORD_SIZE};
use crate::core::{Error, FeedId, Result};

pub use write::{aligned_size, FileState, PostOutcome};

/// Flat-file time-series store.
///
/// Holds only its configuration; every operation reopens the feed file, so
/// a store can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct FeedStore {
    config: StoreConfig,
}

impl FeedStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store rooted at `data_dir` with default limits.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(data_dir))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn feed_path(&self, id: FeedId) -> PathBuf {
        self.config.feed_path(id)
    }

    pub fn feed_exists(&self, id: FeedId) -> bool {
        self.feed_path(id).is_file()
    }

    /// Create the feed's data file if absent. Idempotent.
    ///
    /// Returns whether the file exists afterwards.
    pub fn create_feed(&self, id: FeedId) -> bool {
        let path = self.feed_path(id);
        if let Err(err) = OpenOptions::new().append(true).create(true).open(&path) {
            log::warn!("create_feed could not create data file feedid={id}: {err}");
        }
        let exists = path.is_file();
        if exists {
            log::info!("created feed feedid={id} at {}", path.display());
        }
        exists
    }

    /// Remove the feed's data file.
    ///
    /// Deleting a feed that does not exist is a successful no-op; the
    /// returned flag says whether a file was removed.
    pub fn delete_feed(&self, id: FeedId) -> Result<bool> {
        let path = self.feed_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("deleted feed feedid={id}");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!("delete_feed feedid={id}: no data file, nothing to do");
                Ok(false)
            }
            Err(err) => {
                log::warn!("delete_feed could not remove {}: {err}", path.display());
                Err(Error::Io(err))
            }
        }
    }

    /// Raw data file size in bytes.
    pub fn feed_size(&self, id: FeedId) -> Result<u64> {
        let path = self.feed_path(id);
        match std::fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("feed feedid={id} has no data file at {}", path.display());
                Err(Error::NotFound(id))
            }
            Err(source) => {
                log::warn!("could not stat {}: {source}", path.display());
                Err(Error::OpenFailed { path, source })
            }
        }
    }

    /// Number of whole records stored.
    pub fn record_count(&self, id: FeedId) -> Result<u64> {
        Ok(record_count(self.feed_size(id)?))
    }

    /// Last stored record, or `(0, 0.0)` for an empty feed.
    pub fn lastvalue(&self, id: FeedId) -> Result<Record> {
        let path = self.feed_path(id);
        if !path.exists() {
            return Err(Error::NotFound(id));
        }
        let mut file = FeedFile::open_for_read(&path)?;
        let (_, aligned) = aligned_size(file.len()?);
        if aligned < RECORD_SIZE as u64 {
            return Ok(Record::new(0, 0.0));
        }
        file.read_record_at(aligned - RECORD_SIZE as u64)
    }

    /// Open a feed for reading, mapping a missing file to `OpenFailed`.
    pub(crate) fn open_reader(&self, id: FeedId) -> Result<(FeedFile, u64)> {
        let file = FeedFile::open_for_read(self.feed_path(id))?;
        let len = file.len()?;
        Ok((file, len))
    }
}
