//! Catalog provider backed by a JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarState;

use super::{CatalogError, CatalogProvider, CatalogSnapshot, CityCatalog};

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDocument {
    /// City lists in priority order; merged with duplicates removed.
    pub city_lists: Vec<Vec<String>>,
    /// Identifiers already confirmed.
    pub known_keys: Vec<String>,
    /// Series keyed without a city.
    pub standalone: Vec<String>,
}

impl CatalogDocument {
    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    fn into_snapshot(self) -> CatalogSnapshot {
        CatalogSnapshot {
            cities: CityCatalog::merge(self.city_lists),
            known: self.known_keys.into_iter().collect(),
            standalone: self.standalone,
        }
    }
}

/// Reads the catalog file on every [`CatalogProvider::load`].
#[derive(Debug, Clone)]
pub struct JsonCatalogProvider {
    path: PathBuf,
}

impl JsonCatalogProvider {
    /// Creates a provider reading `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CatalogProvider for JsonCatalogProvider {
    fn load(&self, _calendar: &CalendarState) -> Result<CatalogSnapshot, CatalogError> {
        let text = std::fs::read_to_string(&self.path)?;
        let doc = CatalogDocument::from_json(&text)?;
        let snapshot = doc.into_snapshot();
        tracing::debug!(
            path = %self.path.display(),
            cities = snapshot.cities.len(),
            known = snapshot.known.len(),
            "catalog loaded"
        );
        Ok(snapshot)
    }
}
