use super::facts::{ShareCounts, FACTS_URL};
use super::submissions::{Submission, SUBMISSIONS_URL};
use super::tickers::{Tickers, TICKERS_URL};
use super::CompanySource;
use crate::clock::{Clock, TokioClock};
use crate::fetch::{is_fatal, Fetched, RawResponse, Transport};
use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use rand::Rng;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Where each SEC resource lives; swapped out for mirrors and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecUrls {
    pub tickers: String,
    pub submissions: String,
    pub facts: String,
}

impl Default for SecUrls {
    fn default() -> Self {
        Self {
            tickers: TICKERS_URL.to_string(),
            submissions: SUBMISSIONS_URL.to_string(),
            facts: FACTS_URL.to_string(),
        }
    }
}

impl SecUrls {
    pub fn submission(&self, cik: &str) -> String {
        format!("{}/CIK{cik}.json", self.submissions)
    }

    pub fn facts(&self, cik: &str) -> String {
        format!("{}/CIK{cik}.json", self.facts)
    }
}

/// Client for the SEC's JSON endpoints.
///
/// Every request waits on the shared [`RateLimiter`] first. A 429 is answered with a random
/// backoff, a fresh turn at the limiter, and exactly one retry.
pub struct SecClient {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    urls: SecUrls,
    backoff: (Duration, Duration),
}

impl SecClient {
    pub fn new(transport: Arc<dyn Transport>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            transport,
            limiter,
            clock: Arc::new(TokioClock),
            urls: SecUrls::default(),
            backoff: (Duration::from_secs(5), Duration::from_secs(10)),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_urls(mut self, urls: SecUrls) -> Self {
        self.urls = urls;
        self
    }

    /// Bounds of the random sleep taken after a 429.
    pub fn with_backoff(mut self, low: Duration, high: Duration) -> Self {
        self.backoff = (low, high);
        self
    }

    pub fn urls(&self) -> &SecUrls {
        &self.urls
    }

    /// GET `url` and deserialize the body; `label` names the entity in logs.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, label: &str) -> Fetched<T> {
        let response = match self.send(url, label).await {
            Ok(response) => response,
            Err(outcome) => return outcome,
        };

        let response = if response.is_rate_limited() {
            let backoff = self.backoff();
            warn!("rate limited fetching {label}, retrying once in {backoff:?}");
            self.clock.sleep(backoff).await;

            match self.send(url, label).await {
                Ok(response) if response.is_rate_limited() => {
                    warn!("rate limited again fetching {label}, giving up");
                    return Fetched::NoData("rate limited after retry".to_string());
                }
                Ok(response) => response,
                Err(outcome) => return outcome,
            }
        } else {
            response
        };

        if !response.is_success() {
            warn!("failed to fetch {label}, status({})", response.status);
            return Fetched::NoData(format!("HTTP {}", response.status));
        }

        match serde_json::from_slice(&response.body) {
            Ok(data) => {
                trace!("fetched {label}");
                Fetched::Data(data)
            }
            Err(err) => {
                error!("failed to parse JSON for {label}, error({err})");
                Fetched::NoData(format!("invalid JSON: {err}"))
            }
        }
    }

    // one turn at the limiter, one request
    async fn send<T>(&self, url: &str, label: &str) -> Result<RawResponse, Fetched<T>> {
        self.limiter.acquire().await;
        debug!("GET {url}");
        match self.transport.get(url).await {
            Ok(response) => Ok(response),
            Err(err) if is_fatal(&err) => {
                error!("unrecoverable error fetching {label}, error({err})");
                Err(Fetched::Fatal(err))
            }
            Err(err) => {
                warn!("failed to fetch {label}, error({err})");
                Err(Fetched::NoData(err.to_string()))
            }
        }
    }

    fn backoff(&self) -> Duration {
        let (low, high) = self.backoff;
        if high <= low {
            return low;
        }
        let secs = rand::thread_rng().gen_range(low.as_secs_f64()..=high.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

#[async_trait]
impl CompanySource for SecClient {
    async fn tickers(&self) -> Fetched<Tickers> {
        self.get_json(&self.urls.tickers, "company tickers").await
    }

    async fn submission(&self, cik: &str) -> Fetched<Submission> {
        let url = self.urls.submission(cik);
        self.get_json(&url, &format!("submissions of CIK{cik}"))
            .await
    }

    async fn share_counts(&self, cik: &str) -> Fetched<ShareCounts> {
        let url = self.urls.facts(cik);
        self.get_json::<serde_json::Value>(&url, &format!("facts of CIK{cik}"))
            .await
            .map(|facts| ShareCounts::from_facts(&facts))
    }
}
