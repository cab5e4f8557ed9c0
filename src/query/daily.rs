use jiff::{Timestamp, ToSpan};

use crate::core::locate::locate_nearest;
use crate::core::record::RECORD_SIZE;
use crate::core::{Error, FeedId, Result};
use crate::query::{resolve_timezone, DataPoint};
use crate::store::FeedStore;

impl FeedStore {
    /// One point per local midnight in `timezone` (UTC when `None`).
    ///
    /// Starts at the first midnight after `start_ms` and steps by calendar
    /// days, so days are 23 or 25 hours long across DST changes. A point is
    /// emitted when the record found differs from the previous day's.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidTimezone`: `timezone` is not a known zone name
    /// - `Error::InvalidRange`: `start_ms` is outside the calendar's range
    /// - `Error::OpenFailed`: the feed has no readable data file
    pub fn sample_daily(
        &self,
        id: FeedId,
        start_ms: i64,
        end_ms: i64,
        timezone: Option<&str>,
    ) -> Result<Vec<DataPoint>> {
        let tz = resolve_timezone(timezone)?;
        let start = start_ms / 1000;
        let end = end_ms / 1000;
        let range_err = || Error::InvalidRange { start, end };

        let mut day = Timestamp::from_second(start)
            .map_err(|_| range_err())?
            .to_zoned(tz)
            .start_of_day()
            .and_then(|midnight| midnight.checked_add(1.day()))
            .map_err(|_| range_err())?;

        let (mut file, len) = self.open_reader(id)?;
        if len < RECORD_SIZE as u64 {
            return Ok(Vec::new());
        }

        let mut data = Vec::new();
        let mut previous = None;
        for _ in 0..self.config().max_daily_iterations {
            let time = day.timestamp().as_second();
            if time > end {
                break;
            }
            let pos = locate_nearest(&mut file, time, len)?;
            let record = file.read_record_at(pos)?;
            if previous != Some(record.time) {
                data.push(DataPoint::from_seconds(record.time, record.value));
                previous = Some(record.time);
            }
            day = match day.checked_add(1.day()) {
                Ok(next) => next,
                Err(_) => break,
            };
        }
        Ok(data)
    }
}
