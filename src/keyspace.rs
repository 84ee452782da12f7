//! Candidate key generation and filtering.

use hashbrown::HashSet;

use crate::{
    calendar::CalendarState,
    catalog::{CityCatalog, TemplateCatalog},
    types::{CandidateKey, KnownKeySet, Year},
};

/// Deduplicated candidate keys for one run. Iteration order is meaningless.
pub type KeySpace = HashSet<CandidateKey>;

/// `{city}-{series}-{year}`.
pub fn city_key(city: &str, series: &str, year: Year) -> CandidateKey {
    format!("{city}-{series}-{year}")
}

/// `{series}-{year}`.
pub fn standalone_key(series: &str, year: Year) -> CandidateKey {
    format!("{series}-{year}")
}

/// Builds every plausible key for the calendar month.
///
/// Each (city, template) pair checks its current-year and next-year windows
/// independently, so both years can be emitted. Standalone series always emit
/// both years.
pub fn generate_keys(
    calendar: &CalendarState,
    cities: &CityCatalog,
    templates: &TemplateCatalog,
) -> KeySpace {
    let month = calendar.current_month();
    let this_year = calendar.current_year();
    let next_year = calendar.next_year();

    let mut keys = KeySpace::new();
    for template in templates.templates() {
        let this = template.applies_this_year(month);
        let next = template.applies_next_year(month);
        if !this && !next {
            continue;
        }
        for city in cities.cities() {
            if this {
                keys.insert(city_key(city, &template.name, this_year));
            }
            if next {
                keys.insert(city_key(city, &template.name, next_year));
            }
        }
    }

    for series in templates.standalone() {
        keys.insert(standalone_key(series, this_year));
        keys.insert(standalone_key(series, next_year));
    }

    keys
}

/// Keys not already known, sorted so dispatch order is stable.
pub fn filter_known(keys: &KeySpace, known: &KnownKeySet) -> Vec<CandidateKey> {
    let mut out: Vec<CandidateKey> = keys
        .iter()
        .filter(|k| !known.contains(k.as_str()))
        .cloned()
        .collect();
    out.sort_unstable();
    out
}
