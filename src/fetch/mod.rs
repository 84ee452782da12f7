//! Single-attempt page probes.

/// Randomized request headers.
pub mod headers;
/// reqwest-backed fetcher.
pub mod http;

use std::fmt;
use std::future::Future;

/// Raw response of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// True for `2xx`. Anything else means the page does not exist yet.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Probe failure before any status was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, TLS, or body read failure.
    Transport(String),
    /// The request exceeded its timeout.
    Timeout,
    /// The HTTP client could not be built.
    Client(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Client(msg) => write!(f, "http client error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Performs exactly one GET per call. Implementations must not retry.
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches `url`, returning the status and body of whatever the host served.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send;
}

/// Joins the host base URL and a candidate key.
pub fn candidate_url(base_url: &str, key: &str) -> String {
    format!("{base_url}{key}")
}
