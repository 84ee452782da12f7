//! Speculative discovery of newly published competition pages.
//!
//! Candidate identifiers are built from city names, recurring series names and
//! the months in which each series is plausible, filtered against identifiers
//! already known, then probed with a fixed ceiling on in-flight requests.
//!
//! # Examples
//!
//! Key generation needs no network:
//! ```
//! use compprobe::{
//!     calendar::CalendarState,
//!     catalog::{CityCatalog, CompetitionTemplate, TemplateCatalog},
//!     keyspace::generate_keys,
//! };
//!
//! let cal = CalendarState::new(2024, 3).expect("calendar");
//! let cities = CityCatalog::merge([vec!["Beijing"]]);
//! let templates = TemplateCatalog::new(
//!     vec![CompetitionTemplate::new("Spring", &[1, 2, 3], &[10, 11, 12])],
//!     vec![],
//! );
//! let keys = generate_keys(&cal, &cities, &templates);
//! assert_eq!(keys.len(), 1);
//! assert!(keys.contains("Beijing-Spring-2024"));
//! ```
//!
//! A live run against the host:
//! ```no_run
//! use compprobe::{
//!     config::DiscoveryConfig,
//!     persist::{RecordSink, sqlite::SqliteKnownKeyStore},
//!     session::DiscoverySession,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cfg = DiscoveryConfig::default();
//! let mut store = SqliteKnownKeyStore::open("competitions.db")
//!     .expect("open sqlite")
//!     .with_start_year(cfg.start_year);
//! let session = DiscoverySession::over_http(&cfg, &store).expect("session");
//! let found = session.run().await;
//! store.record_discoveries(&found).expect("record");
//! # }
//! ```
#![warn(missing_docs)]

/// Calendar snapshot and cutover logic.
pub mod calendar;
/// City and series catalogs and their providers.
pub mod catalog;
/// Run settings.
pub mod config;
/// Page fetching and request headers.
pub mod fetch;
/// Candidate key generation and known-key filtering.
pub mod keyspace;
/// Page parsing.
pub mod parse;
/// Storage adapters used by callers.
pub mod persist;
/// Confirmed competition records.
pub mod record;
/// Probe coordinator and events.
pub mod runtime;
/// Discovery session orchestration.
pub mod session;
/// Shared primitive aliases.
pub mod types;
