//! File handles for feed data files.
//!
//! Writers hold an exclusive, non-blocking `flock` for the lifetime of the
//! handle. Readers take no lock at all: a read racing an in-place update can
//! decode a torn record (old time, new value or the reverse). That window is
//! accepted; callers needing a consistent view must serialize externally.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::core::record::{read_record_at, Record, RECORD_SIZE};
use crate::core::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Every write lands at end of file.
    Append,
    /// Positioned reads and writes; the file must already exist.
    ReadWrite,
}

pub struct FeedFile {
    file: File,
    locked: bool,
}

impl FeedFile {
    pub fn open_for_read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| open_failed(path, source))?;
        Ok(Self {
            file,
            locked: false,
        })
    }

    /// Open for writing and take the exclusive lock.
    ///
    /// # Errors
    ///
    /// - `Error::OpenFailed`: the file could not be opened
    /// - `Error::Locked`: another writer holds the lock
    pub fn open_for_write(path: impl AsRef<Path>, mode: WriteMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        match mode {
            WriteMode::Append => options.append(true).create(true),
            WriteMode::ReadWrite => options.read(true).write(true),
        };
        let file = options
            .open(&path)
            .map_err(|source| open_failed(&path, source))?;
        if !try_lock(&file)? {
            log::warn!("{} locked by another process", path.display());
            return Err(Error::Locked(path));
        }
        Ok(Self {
            file,
            locked: true,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn read_record_at(&mut self, offset: u64) -> Result<Record> {
        read_record_at(&mut self.file, offset)
    }

    /// Overwrite (or extend with) one record at `offset`.
    ///
    /// Has no positional effect on handles opened with `WriteMode::Append`.
    pub fn write_record_at(&mut self, offset: u64, record: &Record) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&record.to_bytes())?;
        Ok(())
    }

    pub fn append_record(&mut self, record: &Record) -> Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&record.to_bytes())?;
        Ok(())
    }

    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        Ok(())
    }

    /// Read up to `buf.len()` bytes starting at `offset`, returning the count.
    pub fn read_chunk_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::Io(err)),
            }
        }
        Ok(filled)
    }

    /// Close the handle, releasing the lock if one was held.
    pub fn close(self) {
        drop(self);
    }
}

impl Read for FeedFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FeedFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.file.seek(pos)
    }
}

/// Number of whole records a file of `len` bytes holds.
pub fn record_count(len: u64) -> u64 {
    len / RECORD_SIZE as u64
}

pub(crate) fn try_lock(file: &File) -> Result<bool> {
    let res = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if res == 0 {
        return Ok(true);
    }
    let err = std::io::Error::last_os_error();
    if err.kind() == std::io::ErrorKind::WouldBlock {
        return Ok(false);
    }
    Err(Error::Io(err))
}

fn open_failed(path: &Path, source: std::io::Error) -> Error {
    log::warn!("could not open {}: {source}", path.display());
    Error::OpenFailed {
        path: path.to_path_buf(),
        source,
    }
}
