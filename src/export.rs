//! Streaming exports to an arbitrary byte sink.

use std::io::Write;

use jiff::Timestamp;

use crate::core::record::RECORD_SIZE;
use crate::core::{Error, FeedId, Result};
use crate::query::resolve_timezone;
use crate::store::FeedStore;

/// `dd/mm/yyyy HH:MM:SS` in the requested zone.
pub const CSV_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Round `start_byte` down to a record boundary; negatives clamp to 0.
pub fn align_start_byte(start_byte: i64) -> u64 {
    let start = start_byte.max(0) as u64;
    start - start % RECORD_SIZE as u64
}

impl FeedStore {
    /// Copy the data file from `start_byte` (aligned down) to the end.
    ///
    /// Returns the number of bytes written to `out`.
    pub fn export_raw<W: Write>(&self, id: FeedId, start_byte: i64, out: &mut W) -> Result<u64> {
        let (mut file, len) = self.open_reader(id)?;
        let mut offset = align_start_byte(start_byte);
        let mut buf = vec![0u8; self.config().export_chunk_size];
        let mut written = 0u64;

        while offset < len {
            let want = buf.len().min((len - offset) as usize);
            let read = file.read_chunk_at(offset, &mut buf[..want])?;
            if read == 0 {
                break;
            }
            out.write_all(&buf[..read])?;
            offset += read as u64;
            written += read as u64;
        }
        out.flush()?;
        Ok(written)
    }

    /// Fixed-step sampling streamed as `time,value` lines.
    ///
    /// `time` is epoch seconds, or local time in `timezone` formatted with
    /// [`CSV_TIME_FORMAT`]. Values always carry two decimals. Returns the
    /// number of lines written.
    pub fn export_csv<W: Write>(
        &self,
        id: FeedId,
        start_ms: i64,
        end_ms: i64,
        out_interval_s: i64,
        timezone: Option<&str>,
        out: &mut W,
    ) -> Result<usize> {
        let tz = timezone.map(|name| resolve_timezone(Some(name))).transpose()?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);

        let mut lines = 0;
        self.walk_legacy(id, start_ms, end_ms, out_interval_s, |record| {
            let time = match &tz {
                Some(tz) => Timestamp::from_second(i64::from(record.time))
                    .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?
                    .to_zoned(tz.clone())
                    .strftime(CSV_TIME_FORMAT)
                    .to_string(),
                None => record.time.to_string(),
            };
            writer
                .write_record([time, format!("{:.2}", record.value)])
                .map_err(csv_error)?;
            lines += 1;
            Ok(())
        })?;
        writer.flush()?;
        Ok(lines)
    }
}

fn csv_error(err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(err) => Error::Io(err),
        other => Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("{other:?}"),
        )),
    }
}
