use crate::fetch::Fetched;
use async_trait::async_trait;

/// The SEC HTTP client, rate limited and retrying once on 429.
pub mod client;

/// Bounded, unordered fan-out of per-company enrichment.
pub mod enrich;

/// Weighted share counts out of the XBRL company facts.
pub mod facts;

/// Filer metadata out of the submissions endpoint.
pub mod submissions;

/// The company ticker list; the base set of companies.
pub mod tickers;

pub use super::common::pad_cik;
pub use client::{SecClient, SecUrls};
pub use facts::ShareCounts;
pub use submissions::Submission;
pub use tickers::{Ticker, Tickers};

/// Everything the SEC pipeline reads, one call per resource.
///
/// Implemented by [`SecClient`]; anything else (a fixture, a cache) can stand in for it.
#[async_trait]
pub trait CompanySource: Send + Sync {
    async fn tickers(&self) -> Fetched<Tickers>;

    async fn submission(&self, cik: &str) -> Fetched<Submission>;

    async fn share_counts(&self, cik: &str) -> Fetched<ShareCounts>;
}
