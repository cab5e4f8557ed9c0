//! Range queries built on the point locator.
//!
//! Every query opens the feed once, then resolves each output slot with its
//! own binary search. Nothing is pre-aggregated, which is why interval
//! sampling enforces a point cap.

mod daily;
mod legacy;

use jiff::tz::TimeZone;
use serde::Serialize;

use crate::core::locate::locate_nearest;
use crate::core::record::RECORD_SIZE;
use crate::core::{Error, FeedId, Result};
use crate::store::FeedStore;

/// A resolved point, time in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DataPoint {
    pub time_ms: i64,
    pub value: f32,
}

impl DataPoint {
    pub(crate) fn from_seconds(time: u32, value: f32) -> Self {
        Self {
            time_ms: i64::from(time) * 1000,
            value,
        }
    }
}

/// An interval-sampling slot; `value` is `None` when no record fell close
/// enough to the slot time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub time_ms: i64,
    pub value: Option<f32>,
}

/// Options for [`FeedStore::sample`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleOptions {
    /// Leave out slots that resolved to no value.
    pub skip_missing: bool,
    /// Only accept a record within one interval of the slot time, and report
    /// the slot time instead of the record's own time.
    pub limit_interval: bool,
}

impl FeedStore {
    /// Sample a feed on a fixed grid of `interval_s` seconds over
    /// `[start_ms, end_ms)`.
    ///
    /// Consecutive slots that report the same time collapse into one.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRange`: `end <= start` after conversion to seconds
    /// - `Error::RequestTooLarge`: more than `max_sample_points` slots
    /// - `Error::OpenFailed`: the feed has no readable data file
    pub fn sample(
        &self,
        id: FeedId,
        start_ms: i64,
        end_ms: i64,
        interval_s: i64,
        options: SampleOptions,
    ) -> Result<Vec<Sample>> {
        let start = start_ms / 1000;
        let end = end_ms / 1000;
        let interval = interval_s.max(1);
        if end <= start {
            return Err(Error::InvalidRange { start, end });
        }
        let requested = ((end - start) as u64).div_ceil(interval as u64);
        let limit = self.config().max_sample_points;
        if requested > limit {
            return Err(Error::RequestTooLarge { requested, limit });
        }

        let (mut file, len) = self.open_reader(id)?;
        if len < RECORD_SIZE as u64 {
            return Ok(Vec::new());
        }

        let mut data = Vec::with_capacity(requested as usize);
        let mut last_reported = None;
        for i in 0..requested as i64 {
            let target = start + i * interval;
            let pos = locate_nearest(&mut file, target, len)?;
            let record = file.read_record_at(pos)?;
            let stored = i64::from(record.time);

            let (reported, value) = if options.limit_interval {
                let value = ((stored - target).abs() < interval).then_some(record.value);
                (target, value)
            } else {
                (stored, Some(record.value))
            };

            if last_reported == Some(reported) {
                continue;
            }
            last_reported = Some(reported);

            if value.is_some() || !options.skip_missing {
                data.push(Sample {
                    time_ms: reported * 1000,
                    value,
                });
            }
        }
        Ok(data)
    }
}

/// `None` and "UTC" resolve to UTC; anything else must be a tzdb name.
pub(crate) fn resolve_timezone(name: Option<&str>) -> Result<TimeZone> {
    match name {
        None | Some("UTC") => Ok(TimeZone::UTC),
        Some(name) => TimeZone::get(name).map_err(|_| Error::InvalidTimezone(name.to_string())),
    }
}
