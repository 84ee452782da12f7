//! Shared primitive aliases.

use hashbrown::HashSet;

/// Speculative competition identifier, e.g. `Beijing-Spring-2024`.
pub type CandidateKey = String;
/// Calendar year.
pub type Year = i32;
/// Calendar month, `1..=12`.
pub type Month = u32;
/// Identifiers already confirmed before this run.
pub type KnownKeySet = HashSet<CandidateKey>;
