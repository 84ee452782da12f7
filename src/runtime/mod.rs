//! Bounded-concurrency probe runtime and its event stream.

/// Fan-out/fan-in of probe units.
pub mod coordinator;
/// Probe outcomes, counters, and broadcast events.
pub mod events;
