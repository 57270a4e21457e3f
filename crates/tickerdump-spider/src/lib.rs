//! Collects stock listings from the NASDAQ Trader symbol directory and company data from SEC
//! EDGAR, and upserts both into a store.

pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod load;
pub mod pipeline;
pub mod rate_limit;
pub mod stock;
pub mod store;
pub(crate) mod tui;

pub use config::Config;
pub use error::Error;

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use dotenv::var;
    pub(crate) use reqwest::Client as HttpClient;
}
