//! reqwest implementation of [`PageFetcher`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{FetchError, FetchResponse, PageFetcher, headers::HeaderRandomizer};

/// Async HTTP fetcher that sends randomized headers on each request.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    headers: Arc<HeaderRandomizer>,
}

impl HttpFetcher {
    /// Builds a client with the given per-request timeout.
    pub fn new(timeout: Duration, headers: Arc<HeaderRandomizer>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(16)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client, headers })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in self.headers.headers() {
            request = request.header(name, value);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "probe request failed"
                );
                if e.is_timeout() {
                    return Err(FetchError::Timeout);
                }
                return Err(FetchError::Transport(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        debug!(url = url, status, "probe response");

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "probe body read");
                Ok(FetchResponse {
                    status,
                    body: bytes.to_vec(),
                })
            }
            Err(e) => {
                warn!(url = url, error = %e, "failed to read probe body");
                if e.is_timeout() {
                    Err(FetchError::Timeout)
                } else {
                    Err(FetchError::Transport(e.to_string()))
                }
            }
        }
    }
}
