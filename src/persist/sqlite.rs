//! SQLite store of confirmed competitions and catalog cities.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};

use crate::{
    calendar::CalendarState,
    catalog::{CatalogError, CatalogProvider, CatalogSnapshot, CityCatalog},
    record::DiscoveredRecord,
    types::{KnownKeySet, Year},
};

use super::{PersistResult, RecordSink};

/// Earliest year whose competitions are loaded as known.
pub const DEFAULT_START_YEAR: Year = 2015;

/// SQLite implementation of [`CatalogProvider`] and [`RecordSink`].
pub struct SqliteKnownKeyStore {
    conn: Connection,
    start_year: Year,
}

impl SqliteKnownKeyStore {
    /// Opens or creates a store at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self {
            conn,
            start_year: DEFAULT_START_YEAR,
        })
    }

    /// Sets the earliest year loaded as known.
    pub fn with_start_year(mut self, start_year: Year) -> Self {
        self.start_year = start_year;
        self
    }

    /// Adds cities under a source label. Existing names are left untouched.
    pub fn add_cities<S: AsRef<str>>(&mut self, source: &str, cities: &[S]) -> PersistResult<usize> {
        let tx = self.conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO cities(name, source) VALUES (?1, ?2)")?;
            for city in cities {
                added += stmt.execute(params![city.as_ref(), source])?;
            }
        }
        tx.commit()?;
        Ok(added)
    }

    /// Adds series keyed without a city.
    pub fn add_standalone<S: AsRef<str>>(&mut self, names: &[S]) -> PersistResult<usize> {
        let tx = self.conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO standalone_series(name) VALUES (?1)")?;
            for name in names {
                added += stmt.execute(params![name.as_ref()])?;
            }
        }
        tx.commit()?;
        Ok(added)
    }

    /// Cities in insertion order.
    pub fn cities(&self) -> PersistResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM cities ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Standalone series in insertion order.
    pub fn standalone(&self) -> PersistResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM standalone_series ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Identifiers dated within `start..=end`, plus undated ones.
    pub fn known_keys(&self, start: Year, end: Year) -> PersistResult<KnownKeySet> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM competitions WHERE year IS NULL OR (year BETWEEN ?1 AND ?2)",
        )?;
        let rows = stmt.query_map(params![start, end], |row| row.get::<_, String>(0))?;
        let mut out = KnownKeySet::new();
        for row in rows {
            out.insert(row?);
        }
        Ok(out)
    }

    /// Looks up a stored record by identifier.
    pub fn get(&self, id: &str) -> PersistResult<Option<DiscoveredRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, url, name, date, events FROM competitions WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok(DiscoveredRecord {
                id: row.get(0)?,
                url: row.get(1)?,
                name: row.get(2)?,
                date: row.get(3)?,
                events: row.get(4)?,
            })
        })?;
        Ok(rows.next().transpose()?)
    }
}

impl RecordSink for SqliteKnownKeyStore {
    /// Upserts `records`. A stored row keeps its first-seen timestamp.
    fn record_discoveries(&mut self, records: &[DiscoveredRecord]) -> PersistResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let ts_ms = now_ms();
        let tx = self.conn.transaction()?;
        let mut added = 0;
        {
            let mut exists = tx.prepare("SELECT EXISTS(SELECT 1 FROM competitions WHERE id = ?1)")?;
            let mut upsert = tx.prepare(
                "INSERT INTO competitions(id, url, name, date, events, year, found_ts_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    url = excluded.url,
                    name = excluded.name,
                    date = excluded.date,
                    events = excluded.events,
                    year = excluded.year",
            )?;
            for rec in records {
                let seen: bool = exists.query_row(params![rec.id], |row| row.get(0))?;
                if !seen {
                    added += 1;
                }
                upsert.execute(params![
                    rec.id,
                    rec.url,
                    rec.name,
                    rec.date,
                    rec.events,
                    rec.year(),
                    ts_ms as i64,
                ])?;
            }
        }
        tx.commit()?;
        tracing::info!(added, total = records.len(), "discoveries recorded");
        Ok(added)
    }
}

impl CatalogProvider for SqliteKnownKeyStore {
    fn load(&self, calendar: &CalendarState) -> Result<CatalogSnapshot, CatalogError> {
        let end = calendar.last_listed_year();
        if self.start_year > end {
            return Err(CatalogError::Invalid(format!(
                "start year {} is after last listed year {end}",
                self.start_year
            )));
        }
        let cities = self.cities().map_err(persist_to_catalog)?;
        let known = self
            .known_keys(self.start_year, end)
            .map_err(persist_to_catalog)?;
        let standalone = self.standalone().map_err(persist_to_catalog)?;
        Ok(CatalogSnapshot {
            cities: CityCatalog::merge([cities]),
            known,
            standalone,
        })
    }
}

fn persist_to_catalog(err: super::PersistError) -> CatalogError {
    match err {
        super::PersistError::Sqlite(e) => CatalogError::Sqlite(e),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
