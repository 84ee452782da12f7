//! Probe outcome classification and runtime events.

use serde::{Deserialize, Serialize};

use crate::types::CandidateKey;

/// How one probe unit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeOutcome {
    /// Page exists and parsed into a record.
    Found,
    /// Host answered with a non-2xx status.
    NotFound {
        /// Status code received.
        status: u16,
    },
    /// No response: connection failure, timeout, or a crashed unit.
    Transport,
    /// Page exists but could not be parsed.
    Parse,
}

/// Per-class counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStats {
    /// Units dispatched.
    pub dispatched: usize,
    /// Units that produced a record.
    pub found: usize,
    /// Units answered with a non-2xx status.
    pub not_found: usize,
    /// Units that got no response.
    pub transport: usize,
    /// Units whose page failed to parse.
    pub parse: usize,
}

impl ProbeStats {
    /// Counts one finished unit.
    pub fn record(&mut self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Found => self.found += 1,
            ProbeOutcome::NotFound { .. } => self.not_found += 1,
            ProbeOutcome::Transport => self.transport += 1,
            ProbeOutcome::Parse => self.parse += 1,
        }
    }

    /// Units that have finished so far.
    pub fn finished(&self) -> usize {
        self.found + self.not_found + self.transport + self.parse
    }

    /// True when every dispatched unit failed to reach the host.
    ///
    /// An empty record list alone cannot tell this apart from "nothing new".
    pub fn host_unreachable(&self) -> bool {
        self.dispatched > 0 && self.transport == self.dispatched
    }
}

/// Events broadcast while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A run started with this many units.
    Started {
        /// Units about to be dispatched.
        dispatched: usize,
    },
    /// One unit completed, pacing delay included.
    Finished {
        /// Key the unit probed.
        key: CandidateKey,
        /// Outcome class.
        outcome: ProbeOutcome,
    },
    /// Every unit of the run has completed.
    Completed {
        /// Final counters.
        stats: ProbeStats,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_only_when_all_transport() {
        let mut stats = ProbeStats {
            dispatched: 2,
            ..ProbeStats::default()
        };
        stats.record(ProbeOutcome::Transport);
        assert!(!stats.host_unreachable());
        stats.record(ProbeOutcome::Transport);
        assert!(stats.host_unreachable());
        assert!(!ProbeStats::default().host_unreachable());
    }

    #[test]
    fn not_found_is_not_unreachable() {
        let mut stats = ProbeStats {
            dispatched: 1,
            ..ProbeStats::default()
        };
        stats.record(ProbeOutcome::NotFound { status: 404 });
        assert_eq!(stats.finished(), 1);
        assert!(!stats.host_unreachable());
    }
}
