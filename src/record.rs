//! Confirmed competition record.

use serde::{Deserialize, Serialize};

use crate::types::CandidateKey;

/// Metadata extracted from a competition page that was confirmed to exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredRecord {
    /// Identifier the page was probed under.
    pub id: CandidateKey,
    /// URL that returned the page.
    pub url: String,
    /// Competition title.
    pub name: String,
    /// Date text as displayed on the page.
    pub date: String,
    /// Event list text as displayed on the page.
    pub events: String,
}

impl DiscoveredRecord {
    /// Trailing `-YYYY` of the identifier, if present.
    pub fn year(&self) -> Option<i32> {
        key_year(&self.id)
    }
}

/// Parses the trailing four-digit year of a candidate key.
pub fn key_year(key: &str) -> Option<i32> {
    let (_, tail) = key.rsplit_once('-')?;
    if tail.len() != 4 || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}
