use crate::core::locate::locate_nearest;
use crate::core::record::{Record, RECORD_SIZE};
use crate::core::{Error, FeedId, Result};
use crate::query::DataPoint;
use crate::store::FeedStore;

/// Sampling grid for the fixed-step sampler: `(points, step_seconds)`.
///
/// The range is stretched so it holds a whole number of `out_interval`
/// steps, which leaves the step itself unchanged.
pub(crate) fn legacy_grid(start: i64, end: i64, out_interval: i64) -> Result<(i64, i64)> {
    let out_interval = out_interval.max(1);
    if end <= start {
        return Err(Error::InvalidRange { start, end });
    }
    let points = ((end - start) as u64).div_ceil(out_interval as u64);
    Ok((points as i64, out_interval))
}

impl FeedStore {
    /// Fixed-step sampling without gap handling.
    ///
    /// A point is kept when its stored time moves past the previous sample's
    /// stored time. A previous time of 0 always lets the next point through,
    /// so records stored at t=0 can repeat at the head of the output.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRange`: `end <= start` after conversion to seconds
    /// - `Error::OpenFailed`: the feed has no readable data file
    pub fn sample_legacy(
        &self,
        id: FeedId,
        start_ms: i64,
        end_ms: i64,
        out_interval_s: i64,
    ) -> Result<Vec<DataPoint>> {
        let mut data = Vec::new();
        self.walk_legacy(id, start_ms, end_ms, out_interval_s, |record| {
            data.push(DataPoint::from_seconds(record.time, record.value));
            Ok(())
        })?;
        Ok(data)
    }

    /// Drive the fixed-step sampler, handing each kept record to `emit`.
    pub(crate) fn walk_legacy<F>(
        &self,
        id: FeedId,
        start_ms: i64,
        end_ms: i64,
        out_interval_s: i64,
        mut emit: F,
    ) -> Result<()>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let start = start_ms / 1000;
        let (points, interval) = legacy_grid(start, end_ms / 1000, out_interval_s)?;

        let (mut file, len) = self.open_reader(id)?;
        if len < RECORD_SIZE as u64 {
            return Ok(());
        }

        let mut time = 0u32;
        for i in 0..points {
            let pos = locate_nearest(&mut file, start + i * interval, len)?;
            let record = file.read_record_at(pos)?;
            let last_time = time;
            time = record.time;
            if time > last_time || last_time == 0 {
                emit(record)?;
            }
        }
        Ok(())
    }
}
