pub(crate) mod sql;

pub(crate) mod common;

/// Canonical records written to the store.
pub mod model;

/// Row → record mapping for the symbol directory files.
pub mod normalize;

/// Listings from the NASDAQ Trader [symbol directory]; NASDAQ-listed and other-listed securities.
///
/// [symbol directory]: https://www.nasdaqtrader.com/trader.aspx?id=symboldirdefs
pub mod nasdaq;

/// US company information from the [SEC]; tickers and titles, enriched with submission metadata
/// and share counts from the XBRL company facts.
///
/// [SEC]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod sec;

pub use model::{Address, Company, FormerName, Stock};
pub use normalize::Rejection;
