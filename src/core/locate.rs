//! Binary search over a feed file's record grid.
//!
//! The file is treated as a dense array of 9-byte records sorted by time;
//! every probe offset is derived arithmetically, so there is no index. On an
//! unsorted file both searches still terminate and return an in-bounds
//! aligned offset, but it may not be the right one.

use std::io::{Read, Seek};

use crate::core::record::{read_record_at, RECORD_SIZE};
use crate::core::Result;

/// Enough halvings for files of up to 2^30 records.
pub const MAX_SEARCH_ITERATIONS: usize = 30;

const RECORD: u64 = RECORD_SIZE as u64;

/// Offset of the last record at or before `query_time`, or of the first
/// record when the query precedes everything stored.
///
/// `filesize` is rounded down to whole records so a torn tail is never
/// probed. Returns 0 for an empty file; callers check emptiness first.
pub fn locate_nearest<R: Read + Seek>(reader: &mut R, query_time: i64, filesize: u64) -> Result<u64> {
    let aligned = align_down(filesize);
    if aligned == 0 {
        return Ok(0);
    }
    let last = aligned - RECORD;
    let tail = read_record_at(reader, last)?;
    if query_time >= i64::from(tail.time) {
        return Ok(last);
    }

    // t(start) <= query < t(end), except that start = 0 may sit above query.
    let mut start = 0;
    let mut end = last;
    for _ in 0..MAX_SEARCH_ITERATIONS {
        let mid = probe_offset(start, end);
        let probe = i64::from(read_record_at(reader, mid)?.time);
        if probe == query_time {
            return Ok(mid);
        }
        if end - start <= RECORD {
            return Ok(start);
        }
        if query_time > probe {
            start = mid;
        } else {
            end = mid;
        }
    }
    Ok(start)
}

/// Offset of a record whose time equals `query_time`, if one is found.
pub fn locate_exact<R: Read + Seek>(
    reader: &mut R,
    query_time: i64,
    filesize: u64,
) -> Result<Option<u64>> {
    let aligned = align_down(filesize);
    if aligned == 0 {
        return Ok(None);
    }
    let last = aligned - RECORD;
    let tail = i64::from(read_record_at(reader, last)?.time);
    if query_time == tail {
        return Ok(Some(last));
    }
    if query_time > tail {
        return Ok(None);
    }

    let mut start = 0;
    let mut end = last;
    for _ in 0..MAX_SEARCH_ITERATIONS {
        let mid = probe_offset(start, end);
        let probe = i64::from(read_record_at(reader, mid)?.time);
        if probe == query_time {
            return Ok(Some(mid));
        }
        if end - start <= RECORD {
            return Ok(None);
        }
        if query_time > probe {
            start = mid;
        } else {
            end = mid;
        }
    }
    Ok(None)
}

/// Midpoint of `[start, end]` rounded down to a record boundary.
fn probe_offset(start: u64, end: u64) -> u64 {
    start + ((end - start) / (2 * RECORD)) * RECORD
}

fn align_down(len: u64) -> u64 {
    len - len % RECORD
}
