//! Page-to-record extraction.

/// Default HTML rules for the competition host.
pub mod html;

use std::fmt;

use crate::record::DiscoveredRecord;

/// The fetched page did not have the expected structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A required field was not found.
    MissingField(&'static str),
    /// A CSS selector failed to compile.
    Selector(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::Selector(msg) => write!(f, "bad selector: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Turns the body of a confirmed page into a record.
pub trait PageParser: Send + Sync + 'static {
    /// Parses `body`, fetched for `id` from `url`.
    fn parse(&self, id: &str, url: &str, body: &[u8]) -> Result<DiscoveredRecord, ParseError>;
}
