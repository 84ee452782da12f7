//! Bounded fan-out of probe units with a single shared result list.

use std::sync::Arc;

use hashbrown::HashMap;
use tokio::{
    sync::{Mutex, Semaphore, broadcast},
    task::{self, JoinSet},
    time::Duration,
};
use tracing::{debug, info, warn};

use crate::{
    config::DiscoveryConfig,
    fetch::{FetchError, PageFetcher, candidate_url},
    parse::PageParser,
    record::DiscoveredRecord,
    types::CandidateKey,
};

use super::events::{ProbeEvent, ProbeOutcome, ProbeStats};

/// Settings the coordinator reads on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum units holding a slot at once.
    pub concurrency: usize,
    /// Sleep at the end of every unit.
    pub pacing_delay: Duration,
    /// Prefix joined with each key to form the probe URL.
    pub base_url: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

impl From<&DiscoveryConfig> for CoordinatorConfig {
    fn from(value: &DiscoveryConfig) -> Self {
        Self {
            concurrency: value.concurrency.clamp(1, Semaphore::MAX_PERMITS),
            pacing_delay: value.pacing_delay(),
            base_url: value.base_url.clone(),
        }
    }
}

/// Result of one coordinator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Records of every unit that found a page, in completion order.
    pub records: Vec<DiscoveredRecord>,
    /// Outcome counters.
    pub stats: ProbeStats,
}

/// Runs probe units with a fixed ceiling on how many are in flight.
///
/// Each unit fetches its URL, parses the body if the status was `2xx`, then
/// sleeps for the pacing delay while still holding its slot. Units never
/// affect each other: a failed unit just contributes no record.
pub struct Coordinator<F, P> {
    fetcher: Arc<F>,
    parser: Arc<P>,
    config: CoordinatorConfig,
    events_tx: broadcast::Sender<ProbeEvent>,
}

impl<F, P> Coordinator<F, P>
where
    F: PageFetcher,
    P: PageParser,
{
    /// Creates a coordinator over the given collaborators.
    pub fn new(fetcher: Arc<F>, parser: Arc<P>, config: CoordinatorConfig) -> Self {
        let (events_tx, _) = broadcast::channel(1024);
        Self {
            fetcher,
            parser,
            config,
            events_tx,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Receives [`ProbeEvent`]s for runs started after subscribing.
    pub fn subscribe(&self) -> broadcast::Receiver<ProbeEvent> {
        self.events_tx.subscribe()
    }

    /// Probes every key and waits for all units to complete.
    ///
    /// There is no cancellation; a run always drains every dispatched unit.
    pub async fn run(&self, keys: Vec<CandidateKey>) -> DiscoveryReport {
        let mut stats = ProbeStats {
            dispatched: keys.len(),
            ..ProbeStats::default()
        };
        info!(
            dispatched = stats.dispatched,
            concurrency = self.config.concurrency,
            "probe run starting"
        );
        let _ = self.events_tx.send(ProbeEvent::Started {
            dispatched: stats.dispatched,
        });

        let permits = self.config.concurrency.clamp(1, Semaphore::MAX_PERMITS);
        let slots = Arc::new(Semaphore::new(permits));
        let found = Arc::new(Mutex::new(Vec::<DiscoveredRecord>::new()));
        let mut units = JoinSet::new();
        let mut pending: HashMap<task::Id, CandidateKey> = HashMap::with_capacity(keys.len());

        for key in keys {
            let handle = units.spawn(probe_unit(
                key.clone(),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.parser),
                Arc::clone(&slots),
                Arc::clone(&found),
                self.config.base_url.clone(),
                self.config.pacing_delay,
            ));
            pending.insert(handle.id(), key);
        }

        while let Some(joined) = units.join_next_with_id().await {
            let (key, outcome) = match joined {
                Ok((id, (key, outcome))) => {
                    pending.remove(&id);
                    (key, outcome)
                }
                Err(err) => {
                    let key = pending.remove(&err.id()).unwrap_or_default();
                    warn!(key = %key, error = %err, "probe unit aborted");
                    (key, ProbeOutcome::Transport)
                }
            };
            stats.record(outcome);
            let _ = self.events_tx.send(ProbeEvent::Finished { key, outcome });
        }

        let records = std::mem::take(&mut *found.lock().await);
        info!(
            found = stats.found,
            not_found = stats.not_found,
            transport = stats.transport,
            parse = stats.parse,
            "probe run complete"
        );
        if stats.host_unreachable() {
            warn!(dispatched = stats.dispatched, "no probe reached the host");
        }
        let _ = self.events_tx.send(ProbeEvent::Completed { stats });

        DiscoveryReport { records, stats }
    }
}

async fn probe_unit<F, P>(
    key: CandidateKey,
    fetcher: Arc<F>,
    parser: Arc<P>,
    slots: Arc<Semaphore>,
    found: Arc<Mutex<Vec<DiscoveredRecord>>>,
    base_url: String,
    pacing_delay: Duration,
) -> (CandidateKey, ProbeOutcome)
where
    F: PageFetcher,
    P: PageParser,
{
    // The semaphore is never closed, so acquisition only fails if that changes.
    let Ok(_slot) = slots.acquire_owned().await else {
        return (key, ProbeOutcome::Transport);
    };

    let url = candidate_url(&base_url, &key);
    let outcome = match fetcher.fetch(&url).await {
        Ok(resp) if resp.is_success() => match parser.parse(&key, &url, &resp.body) {
            Ok(record) => {
                info!(key = %key, name = %record.name, "competition found");
                found.lock().await.push(record);
                ProbeOutcome::Found
            }
            Err(err) => {
                debug!(key = %key, error = %err, "page did not parse");
                ProbeOutcome::Parse
            }
        },
        Ok(resp) => {
            debug!(key = %key, status = resp.status, "not published");
            ProbeOutcome::NotFound {
                status: resp.status,
            }
        }
        Err(FetchError::Timeout) => {
            debug!(key = %key, "probe timed out");
            ProbeOutcome::Transport
        }
        Err(err) => {
            debug!(key = %key, error = %err, "probe failed");
            ProbeOutcome::Transport
        }
    };

    tokio::time::sleep(pacing_delay).await;
    (key, outcome)
}
