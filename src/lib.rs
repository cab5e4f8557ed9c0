//! Per-feed flat-file time-series store.
//!
//! Each feed is a single file of 9-byte records (tag, u32 seconds, f32
//! value) kept in time order by the write path. Lookups are binary searches
//! over byte offsets; there is no index, header or checksum.
//!
//! # Example
//!
//! ```no_run
//! use feedlog::{FeedStore, SampleOptions, StoreConfig};
//!
//! let store = FeedStore::new(StoreConfig::new("/var/lib/feeds"));
//! store.create_feed(7);
//! store.post(7, 1_700_000_000, 21.5)?;
//! store.post(7, 1_700_000_010, 21.75)?;
//!
//! let points = store.sample(
//!     7,
//!     1_700_000_000_000,
//!     1_700_000_060_000,
//!     10,
//!     SampleOptions::default(),
//! )?;
//! # Ok::<(), feedlog::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod export;
pub mod query;
pub mod store;

pub use crate::config::StoreConfig;
pub use crate::core::{Error, FeedId, Record, Result};
pub use crate::query::{DataPoint, Sample, SampleOptions};
pub use crate::store::{FeedStore, FileState, PostOutcome};
