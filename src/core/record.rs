use std::io::{Read, Seek, SeekFrom};

use crate::core::{Error, Result};

pub const RECORD_SIZE: usize = 9;
pub const RECORD_TAG: u8 = 0xF9;

pub const TAG_OFFSET: usize = 0;
pub const TIME_OFFSET: usize = 1;
pub const VALUE_OFFSET: usize = 5;

/// One stored sample: Unix seconds plus an `f32` value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    pub time: u32,
    pub value: f32,
}

impl Record {
    pub fn new(time: u32, value: f32) -> Self {
        Self { time, value }
    }

    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        encode(self.time, self.value)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (time, value) = decode(bytes)?;
        Ok(Self { time, value })
    }
}

/// Layout: tag byte (always 249), u32 LE seconds, f32 LE value.
pub fn encode(time: u32, value: f32) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];
    buf[TAG_OFFSET] = RECORD_TAG;
    buf[TIME_OFFSET..TIME_OFFSET + 4].copy_from_slice(&time.to_le_bytes());
    buf[VALUE_OFFSET..VALUE_OFFSET + 4].copy_from_slice(&value.to_le_bytes());
    buf
}

/// The tag byte is not validated.
pub fn decode(bytes: &[u8]) -> Result<(u32, f32)> {
    if bytes.len() < RECORD_SIZE {
        return Err(Error::MalformedRecord {
            offset: 0,
            len: bytes.len(),
        });
    }
    let mut time = [0u8; 4];
    time.copy_from_slice(&bytes[TIME_OFFSET..TIME_OFFSET + 4]);
    let mut value = [0u8; 4];
    value.copy_from_slice(&bytes[VALUE_OFFSET..VALUE_OFFSET + 4]);
    Ok((u32::from_le_bytes(time), f32::from_le_bytes(value)))
}

/// Seek to `offset` and read exactly one record.
///
/// A short read (truncated tail, offset past the end) is reported as
/// `Error::MalformedRecord` carrying the offset and the bytes obtained.
pub fn read_record_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Record> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = [0u8; RECORD_SIZE];
    let mut filled = 0;
    while filled < RECORD_SIZE {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::Io(err)),
        }
    }
    if filled != RECORD_SIZE {
        return Err(Error::MalformedRecord {
            offset,
            len: filled,
        });
    }
    Record::from_bytes(&buf)
}
