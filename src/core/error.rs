use std::fmt;
use std::path::PathBuf;

use crate::core::FeedId;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    Locked(PathBuf),
    MalformedRecord {
        offset: u64,
        len: usize,
    },
    InvalidRange {
        start: i64,
        end: i64,
    },
    RequestTooLarge {
        requested: u64,
        limit: u64,
    },
    NotFound(FeedId),
    InvalidTimezone(String),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::OpenFailed { path, source } => {
                write!(f, "could not open {}: {source}", path.display())
            }
            Error::Locked(path) => write!(f, "{} locked by another writer", path.display()),
            Error::MalformedRecord { offset, len } => {
                write!(f, "malformed record at offset {offset}: read {len} of 9 bytes")
            }
            Error::InvalidRange { start, end } => {
                write!(f, "request end time {end} not after start time {start}")
            }
            Error::RequestTooLarge { requested, limit } => write!(
                f,
                "request datapoint limit reached ({limit}), requested datapoints = {requested}"
            ),
            Error::NotFound(id) => write!(f, "feed {id} not found"),
            Error::InvalidTimezone(name) => write!(f, "unknown timezone: {name}"),
            Error::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::OpenFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
