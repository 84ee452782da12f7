//! Storage adapters for known identifiers and confirmed records.
//!
//! The discovery engine never writes through these; callers persist the
//! records a session returns.

/// SQLite-backed known-key store.
pub mod sqlite;

use std::fmt;

use crate::record::DiscoveredRecord;

/// Storage failure.
#[derive(Debug)]
pub enum PersistError {
    /// SQLite error.
    Sqlite(rusqlite::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "sqlite error: {e}"),
        }
    }
}

impl std::error::Error for PersistError {}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Result alias for storage calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Destination for records returned by a discovery session.
pub trait RecordSink: Send {
    /// Stores `records`, returning how many ids were not stored before.
    fn record_discoveries(&mut self, records: &[DiscoveredRecord]) -> PersistResult<usize>;
}
