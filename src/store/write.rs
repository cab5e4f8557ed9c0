//! Post/update path.
//!
//! Each post opens the existing file read-write, takes the writer lock,
//! classifies the file by the length seen under the lock and then applies
//! exactly one of: repair, append, update in place, or drop.

use crate::core::file::{FeedFile, WriteMode};
use crate::core::locate::locate_exact;
use crate::core::record::{Record, RECORD_SIZE};
use crate::core::{FeedId, Result};
use crate::store::FeedStore;

const RECORD: u64 = RECORD_SIZE as u64;

/// Alignment check: `(valid, largest aligned size <= len)`.
pub fn aligned_size(len: u64) -> (bool, u64) {
    let repaired = len - len % RECORD;
    (repaired == len, repaired)
}

/// Shape of a data file as seen by the write path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileState {
    Empty,
    Aligned { len: u64 },
    /// A torn tail: `len` is not a multiple of the record size.
    Misaligned { len: u64, repaired: u64 },
}

impl FileState {
    pub fn classify(len: u64) -> Self {
        match aligned_size(len) {
            (true, 0) => FileState::Empty,
            (true, len) => FileState::Aligned { len },
            (false, repaired) => FileState::Misaligned { len, repaired },
        }
    }
}

/// What a post did to the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostOutcome {
    /// Written at end of file.
    Appended,
    /// An existing record with the same time was overwritten.
    Updated,
    /// The torn tail was truncated and the record written in its place.
    Repaired,
    /// Older than the last record and matching no stored time; nothing written.
    Dropped,
}

impl PostOutcome {
    pub fn is_written(&self) -> bool {
        !matches!(self, PostOutcome::Dropped)
    }
}

impl FeedStore {
    /// Append or update one datapoint.
    ///
    /// Points newer than the last record are appended; points whose time
    /// already exists are overwritten in place; any other out-of-order point
    /// is dropped and reported as [`PostOutcome::Dropped`].
    ///
    /// # Errors
    ///
    /// - `Error::NotFound`: the feed has no data file
    /// - `Error::OpenFailed`: the data file could not be opened for writing,
    ///   including when it was removed after the existence check
    /// - `Error::Locked`: another writer holds the feed
    pub fn post(&self, id: FeedId, time: u32, value: f32) -> Result<PostOutcome> {
        log::info!("post feedid={id} time={time} value={value}");
        self.feed_size(id)?;

        let mut file = FeedFile::open_for_write(self.feed_path(id), WriteMode::ReadWrite)?;
        let outcome = apply(&mut file, Record::new(time, value), id);
        file.close();
        outcome
    }

    /// Same semantics as [`FeedStore::post`].
    pub fn update(&self, id: FeedId, time: u32, value: f32) -> Result<PostOutcome> {
        self.post(id, time, value)
    }
}

/// Dispatch on the file's shape as seen through the locked handle.
fn apply(file: &mut FeedFile, record: Record, id: FeedId) -> Result<PostOutcome> {
    match FileState::classify(file.len()?) {
        FileState::Misaligned { len, repaired } => {
            log::warn!(
                "post() filesize {len} not integer multiple of {RECORD_SIZE} bytes, correcting feedid={id}"
            );
            file.truncate(repaired)?;
            file.write_record_at(repaired, &record)?;
            Ok(PostOutcome::Repaired)
        }
        FileState::Empty => {
            file.append_record(&record)?;
            Ok(PostOutcome::Appended)
        }
        FileState::Aligned { len } => {
            let last = file.read_record_at(len - RECORD)?;
            if record.time > last.time {
                file.write_record_at(len, &record)?;
                return Ok(PostOutcome::Appended);
            }
            match locate_exact(file, i64::from(record.time), len)? {
                Some(pos) => {
                    file.write_record_at(pos, &record)?;
                    Ok(PostOutcome::Updated)
                }
                None => {
                    log::debug!(
                        "post() feedid={id} time={} older than last record and not stored, dropped",
                        record.time
                    );
                    Ok(PostOutcome::Dropped)
                }
            }
        }
    }
}
