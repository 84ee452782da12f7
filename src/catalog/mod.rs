//! City and competition-series catalogs.

/// JSON file catalog provider.
pub mod json;

use std::fmt;

use hashbrown::HashSet;

use crate::{
    calendar::CalendarState,
    types::{KnownKeySet, Month},
};

/// Failure to load catalog data. Fatal to session construction.
#[derive(Debug)]
pub enum CatalogError {
    /// Reading the backing file failed.
    Io(std::io::Error),
    /// The JSON document is malformed.
    Json(serde_json::Error),
    /// The SQLite source failed.
    Sqlite(rusqlite::Error),
    /// Data loaded but is unusable.
    Invalid(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "catalog io error: {e}"),
            Self::Json(e) => write!(f, "catalog json error: {e}"),
            Self::Sqlite(e) => write!(f, "catalog sqlite error: {e}"),
            Self::Invalid(msg) => write!(f, "invalid catalog: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Ordered, duplicate-free list of city names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityCatalog {
    cities: Vec<String>,
}

impl CityCatalog {
    /// Merges source lists in order. First occurrence wins; blank names are dropped.
    pub fn merge<I, L, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut cities = Vec::new();
        for list in lists {
            for city in list {
                let city = city.into();
                let trimmed = city.trim();
                if trimmed.is_empty() || seen.contains(trimmed) {
                    continue;
                }
                seen.insert(trimmed.to_string());
                cities.push(trimmed.to_string());
            }
        }
        Self { cities }
    }

    /// Cities in merge order.
    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// True when no city is known.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// City-bound competition series with its month windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionTemplate {
    /// Series name, e.g. `Spring-Open`.
    pub name: String,
    /// Months in which a current-year instance is plausible.
    pub current_year_months: Vec<Month>,
    /// Months in which a next-year instance is plausible.
    pub next_year_months: Vec<Month>,
}

impl CompetitionTemplate {
    /// Creates a template from its two month windows.
    pub fn new(name: impl Into<String>, current_year_months: &[Month], next_year_months: &[Month]) -> Self {
        Self {
            name: name.into(),
            current_year_months: current_year_months.to_vec(),
            next_year_months: next_year_months.to_vec(),
        }
    }

    /// True when `month` is in the current-year window.
    pub fn applies_this_year(&self, month: Month) -> bool {
        self.current_year_months.contains(&month)
    }

    /// True when `month` is in the next-year window.
    pub fn applies_next_year(&self, month: Month) -> bool {
        self.next_year_months.contains(&month)
    }
}

/// Read-only set of city-bound and standalone series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: Vec<CompetitionTemplate>,
    standalone: Vec<String>,
}

impl TemplateCatalog {
    /// Creates a catalog from explicit parts.
    pub fn new(templates: Vec<CompetitionTemplate>, standalone: Vec<String>) -> Self {
        Self {
            templates,
            standalone,
        }
    }

    /// Default series table for the host.
    pub fn builtin() -> Self {
        const ALL_YEAR: &[Month] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let templates = vec![
            CompetitionTemplate::new("Open", ALL_YEAR, &[10, 11, 12]),
            CompetitionTemplate::new("Spring", &[1, 2, 3], &[10, 11, 12]),
            CompetitionTemplate::new("Spring-Open", &[1, 2, 3], &[10, 11, 12]),
            CompetitionTemplate::new("Summer", &[2, 3, 4, 5, 6], &[]),
            CompetitionTemplate::new("Summer-Open", &[2, 3, 4, 5, 6], &[]),
            CompetitionTemplate::new("Autumn", &[6, 7, 8, 9, 10], &[]),
            CompetitionTemplate::new("Autumn-Open", &[6, 7, 8, 9, 10], &[]),
            CompetitionTemplate::new("Winter", &[1, 2], &[9, 10, 11, 12]),
            CompetitionTemplate::new("Winter-Open", &[1, 2], &[9, 10, 11, 12]),
            CompetitionTemplate::new("Newcomers", &[1, 2], &[12]),
            CompetitionTemplate::new("New-Year", &[1, 2], &[11, 12]),
        ];
        Self::new(templates, Vec::new())
    }

    /// Returns a copy with extra standalone series appended (duplicates skipped).
    pub fn with_standalone<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.standalone.contains(&name) {
                self.standalone.push(name);
            }
        }
        self
    }

    /// City-bound series.
    pub fn templates(&self) -> &[CompetitionTemplate] {
        &self.templates
    }

    /// Series keyed without a city.
    pub fn standalone(&self) -> &[String] {
        &self.standalone
    }
}

/// Catalog data loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Merged city list.
    pub cities: CityCatalog,
    /// Identifiers that must not be probed again.
    pub known: KnownKeySet,
    /// Standalone series contributed by the provider.
    pub standalone: Vec<String>,
}

/// Source of cities and already-known identifiers.
pub trait CatalogProvider {
    /// Loads the catalog for the session's calendar.
    fn load(&self, calendar: &CalendarState) -> Result<CatalogSnapshot, CatalogError>;
}

/// Provider over data already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogProvider {
    snapshot: CatalogSnapshot,
}

impl StaticCatalogProvider {
    /// Wraps a prepared snapshot.
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self { snapshot }
    }
}

impl CatalogProvider for StaticCatalogProvider {
    fn load(&self, _calendar: &CalendarState) -> Result<CatalogSnapshot, CatalogError> {
        Ok(self.snapshot.clone())
    }
}
