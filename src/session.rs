//! One discovery run from calendar snapshot to confirmed records.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::{
    calendar::{CalendarError, CalendarState},
    catalog::{CatalogError, CatalogProvider, CityCatalog, TemplateCatalog},
    config::{ConfigError, DiscoveryConfig},
    fetch::{
        FetchError, PageFetcher,
        headers::{HeaderPools, HeaderRandomizer},
        http::HttpFetcher,
    },
    keyspace::{filter_known, generate_keys},
    parse::{PageParser, ParseError, html::HtmlPageParser},
    record::DiscoveredRecord,
    runtime::{
        coordinator::{Coordinator, CoordinatorConfig, DiscoveryReport},
        events::ProbeEvent,
    },
    types::{CandidateKey, KnownKeySet},
};

/// Failure to set up a session. No probe is dispatched when this occurs.
#[derive(Debug)]
pub enum SessionError {
    /// Configuration rejected.
    Config(ConfigError),
    /// Wall clock produced an unusable calendar.
    Calendar(CalendarError),
    /// Catalog could not be loaded.
    Catalog(CatalogError),
    /// HTTP client could not be built.
    Fetch(FetchError),
    /// Parser rules could not be compiled.
    Parse(ParseError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Calendar(e) => write!(f, "{e}"),
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Fetch(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ConfigError> for SessionError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<CalendarError> for SessionError {
    fn from(value: CalendarError) -> Self {
        Self::Calendar(value)
    }
}

impl From<CatalogError> for SessionError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<FetchError> for SessionError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

impl From<ParseError> for SessionError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

/// Discovery run with its calendar and catalogs fixed at construction.
///
/// Candidate generation is deterministic for an unchanged calendar, catalog
/// and known set; only probe outcomes depend on the host.
pub struct DiscoverySession<F, P> {
    calendar: CalendarState,
    cities: CityCatalog,
    templates: TemplateCatalog,
    known: KnownKeySet,
    coordinator: Coordinator<F, P>,
}

impl<F, P> DiscoverySession<F, P>
where
    F: PageFetcher,
    P: PageParser,
{
    /// Snapshots the wall clock and loads the catalog from `provider`.
    pub fn new(
        config: &DiscoveryConfig,
        provider: &dyn CatalogProvider,
        templates: TemplateCatalog,
        fetcher: F,
        parser: P,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let calendar = CalendarState::now(config.cutover_month)?;
        Self::assemble(config, calendar, provider, templates, fetcher, parser)
    }

    /// Same as [`DiscoverySession::new`] with an explicit calendar.
    pub fn with_calendar(
        config: &DiscoveryConfig,
        calendar: CalendarState,
        provider: &dyn CatalogProvider,
        templates: TemplateCatalog,
        fetcher: F,
        parser: P,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        Self::assemble(config, calendar, provider, templates, fetcher, parser)
    }

    fn assemble(
        config: &DiscoveryConfig,
        calendar: CalendarState,
        provider: &dyn CatalogProvider,
        templates: TemplateCatalog,
        fetcher: F,
        parser: P,
    ) -> Result<Self, SessionError> {
        let snapshot = provider.load(&calendar)?;
        let templates = templates.with_standalone(snapshot.standalone);
        info!(
            year = calendar.current_year(),
            month = calendar.current_month(),
            cities = snapshot.cities.len(),
            templates = templates.templates().len(),
            standalone = templates.standalone().len(),
            known = snapshot.known.len(),
            "discovery session ready"
        );

        Ok(Self {
            calendar,
            cities: snapshot.cities,
            templates,
            known: snapshot.known,
            coordinator: Coordinator::new(
                Arc::new(fetcher),
                Arc::new(parser),
                CoordinatorConfig::from(config),
            ),
        })
    }

    /// Calendar snapshot of this session.
    pub fn calendar(&self) -> &CalendarState {
        &self.calendar
    }

    /// Identifiers excluded from probing.
    pub fn known(&self) -> &KnownKeySet {
        &self.known
    }

    /// Subscribes to probe events of subsequent runs.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProbeEvent> {
        self.coordinator.subscribe()
    }

    /// Keys that a run would dispatch, without touching the network.
    pub fn candidates(&self) -> Vec<CandidateKey> {
        let keys = generate_keys(&self.calendar, &self.cities, &self.templates);
        let survivors = filter_known(&keys, &self.known);
        info!(
            generated = keys.len(),
            dispatch = survivors.len(),
            "candidate keys prepared"
        );
        survivors
    }

    /// Probes every candidate and returns the confirmed records.
    pub async fn run(&self) -> Vec<DiscoveredRecord> {
        self.run_with_report().await.records
    }

    /// Like [`DiscoverySession::run`] but also returns outcome counters.
    pub async fn run_with_report(&self) -> DiscoveryReport {
        let keys = self.candidates();
        self.coordinator.run(keys).await
    }
}

impl DiscoverySession<HttpFetcher, HtmlPageParser> {
    /// Session probing the live host with the built-in series table.
    pub fn over_http(config: &DiscoveryConfig, provider: &dyn CatalogProvider) -> Result<Self, SessionError> {
        let pools = HeaderPools::default();
        let headers = match config.header_seed {
            Some(seed) => HeaderRandomizer::new(pools, seed),
            None => HeaderRandomizer::from_entropy(pools),
        };
        let fetcher = HttpFetcher::new(config.request_timeout(), Arc::new(headers))?;
        let parser = HtmlPageParser::new(config.date_label.clone())?;
        Self::new(config, provider, TemplateCatalog::builtin(), fetcher, parser)
    }
}
