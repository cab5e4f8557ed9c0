//! Storage primitives: the 9-byte record codec, locked feed file handles and
//! the binary-search point locator.

pub mod error;
pub mod file;
pub mod locate;
pub mod record;

pub use error::{Error, Result};
pub use file::{FeedFile, WriteMode};
pub use locate::{locate_exact, locate_nearest, MAX_SEARCH_ITERATIONS};
pub use record::{decode, encode, Record, RECORD_SIZE, RECORD_TAG};

/// Integer feed identifier; maps 1:1 to a data file.
pub type FeedId = u32;
