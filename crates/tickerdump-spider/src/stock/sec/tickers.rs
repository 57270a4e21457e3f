use crate::stock::common::de_cik;
use crate::stock::model::Company;
use crate::stock::normalize::Rejection;
use serde::de::Visitor;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

pub const TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tickers(pub Vec<Ticker>);

/// One entry of the ticker list, exactly as sent; nothing is required yet.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Ticker {
    #[serde(rename = "cik_str", default, deserialize_with = "de_cik")]
    pub cik: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

struct TickerVisitor;

impl<'de> Visitor<'de> for TickerVisitor {
    type Value = Tickers;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("Map of tickers")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        // each entry is in the form of:
        // `"0": { "cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc." },
        //  "1": { ... },
        //  ...`
        let mut tickers: Vec<Ticker> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            // a badly typed entry costs only itself
            match Ticker::deserialize(value) {
                Ok(ticker) => tickers.push(ticker),
                Err(err) => warn!("skipping SEC ticker entry {key}, error({err})"),
            }
        }
        Ok(Tickers(tickers))
    }
}

impl<'de> Deserialize<'de> for Tickers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // we want a vector returned, but the deserialize will expect a map, given
        // how the API has been designed
        deserializer.deserialize_map(TickerVisitor)
    }
}

// transform
// ----------------------------------------------------------------------------

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Ticker {
    /// A base [`Company`] with only the identity fields set.
    pub fn normalize(&self) -> Result<Company, Rejection> {
        let cik = self.cik.clone().ok_or(Rejection::MissingField("cik"))?;
        let symbol = non_empty(&self.ticker).ok_or(Rejection::MissingField("symbol"))?;
        let security_name =
            non_empty(&self.title).ok_or(Rejection::MissingField("security_name"))?;
        Ok(Company::new(cik, symbol, security_name))
    }
}

impl Tickers {
    /// Normalize every entry, dropping malformed ones and any repeat of a CIK already seen.
    ///
    /// The SEC lists one entry per share class (`GOOGL`, `GOOG`, ...) under the same CIK; the first,
    /// highest ranked, one wins.
    pub fn into_companies(self) -> Vec<Company> {
        let total = self.0.len();
        let mut seen = HashSet::with_capacity(total);
        let mut companies = Vec::with_capacity(total);

        for ticker in self.0 {
            match ticker.normalize() {
                Ok(company) => {
                    if seen.insert(company.cik.clone()) {
                        companies.push(company);
                    } else {
                        debug!(
                            "skipping [{}] {}, CIK already listed",
                            company.symbol, company.cik
                        );
                    }
                }
                Err(rejection) => warn!(
                    "skipping SEC ticker [{}] {}: {rejection}",
                    ticker.ticker.as_deref().unwrap_or("?"),
                    ticker.cik.as_deref().unwrap_or("?"),
                ),
            }
        }

        debug!("{} companies normalized out of {total} tickers", companies.len());
        companies
    }
}
