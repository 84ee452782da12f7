//! Per-request header generation from fixed pools and a seeded RNG.

use std::sync::Mutex;

use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Header name carrying the per-request nonce.
pub const NONCE_HEADER: &str = "Eagleid";

/// Immutable value pools headers are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPools {
    /// `User-Agent` candidates.
    pub user_agents: Vec<String>,
    /// `Accept-Language` candidates.
    pub languages: Vec<String>,
}

impl Default for HeaderPools {
    fn default() -> Self {
        Self {
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (iPhone; CPU iPhone OS 16_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1".to_string(),
            ],
            languages: vec!["zh-CN,zh;q=0.9,en;q=0.8".to_string()],
        }
    }
}

/// Builds a fresh header set for every request.
///
/// The RNG is seeded explicitly so tests can replay the exact sequence of
/// choices. Shared across probe tasks behind a mutex.
#[derive(Debug)]
pub struct HeaderRandomizer {
    pools: HeaderPools,
    rng: Mutex<StdRng>,
}

impl HeaderRandomizer {
    /// Creates a randomizer over `pools` seeded with `seed`.
    pub fn new(pools: HeaderPools, seed: u64) -> Self {
        Self {
            pools,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeds from OS entropy.
    pub fn from_entropy(pools: HeaderPools) -> Self {
        Self {
            pools,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Pools in use.
    pub fn pools(&self) -> &HeaderPools {
        &self.pools
    }

    /// Returns `(name, value)` pairs for one request.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let (user_agent, language, nonce) = {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let user_agent = self.pools.user_agents.choose(&mut *rng).cloned();
            let language = self.pools.languages.choose(&mut *rng).cloned();
            let nonce: u64 = rng.r#gen();
            (user_agent, language, nonce)
        };

        let mut out = vec![
            ("Cache-Control", "no-cache".to_string()),
            ("Accept", ACCEPT.to_string()),
        ];
        if let Some(ua) = user_agent {
            out.push(("User-Agent", ua));
        }
        if let Some(lang) = language {
            out.push(("Accept-Language", lang));
        }
        out.push((
            "Date",
            Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        ));
        out.push((NONCE_HEADER, format!("{nonce:x}")));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_date(h: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        h.into_iter().filter(|(k, _)| *k != "Date").collect()
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = HeaderRandomizer::new(HeaderPools::default(), 7);
        let b = HeaderRandomizer::new(HeaderPools::default(), 7);
        for _ in 0..5 {
            assert_eq!(without_date(a.headers()), without_date(b.headers()));
        }
    }

    #[test]
    fn values_come_from_pools() {
        let pools = HeaderPools::default();
        let r = HeaderRandomizer::new(pools.clone(), 1);
        for _ in 0..20 {
            let h = r.headers();
            let ua = h.iter().find(|(k, _)| *k == "User-Agent").unwrap();
            assert!(pools.user_agents.contains(&ua.1));
            let nonce = h.iter().find(|(k, _)| *k == NONCE_HEADER).unwrap();
            assert!(u64::from_str_radix(&nonce.1, 16).is_ok());
        }
    }

    #[test]
    fn empty_pools_skip_headers() {
        let r = HeaderRandomizer::new(
            HeaderPools {
                user_agents: vec![],
                languages: vec![],
            },
            3,
        );
        let h = r.headers();
        assert!(h.iter().all(|(k, _)| *k != "User-Agent" && *k != "Accept-Language"));
    }
}
