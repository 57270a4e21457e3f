use super::sql;
use crate::store::{Record, Table};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Output
// ======
// {
//      "id": "AAPL:NASDAQ",
//      "symbol": "AAPL",
//      "security_name": "Apple Inc. - Common Stock",
//      "exchange": "NASDAQ",
//      "market_category": "Q",
//      "test_issue": false,
//      "financial_status": "N",
//      "round_lot_size": 100,
//      "etf": false,
//      "next_shares": false,
//      "cqs_symbol": null
// }
/// One security from the symbol directory, keyed by `"{symbol}:{exchange}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: String,
    pub symbol: String,
    pub security_name: String,
    pub exchange: String,
    pub market_category: Option<String>,
    pub test_issue: bool,
    pub financial_status: Option<String>,
    pub round_lot_size: i32,
    pub etf: bool,
    pub next_shares: bool,
    pub cqs_symbol: Option<String>,
}

impl Stock {
    pub fn composite_id(symbol: &str, exchange: &str) -> String {
        format!("{symbol}:{exchange}")
    }
}

impl Record for Stock {
    const TABLE: Table = sql::STOCKS;

    fn key(&self) -> &str {
        &self.id
    }
}

/// One SEC filer, keyed by its zero-padded CIK.
///
/// Built from the ticker list with only `cik`, `symbol` and `security_name` set; everything
/// else arrives through enrichment, which returns a new `Company` rather than editing this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub cik: String,
    pub symbol: String,
    pub security_name: String,
    pub entity_type: Option<String>,
    pub sic: Option<String>,
    pub sic_description: Option<String>,
    pub ein: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub investor_website: Option<String>,
    pub category: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub state_of_incorporation: Option<String>,
    pub state_of_incorporation_description: Option<String>,
    pub phone: Option<String>,
    pub flags: Option<String>,
    pub exchanges: Vec<String>,
    pub business_address: Option<Address>,
    pub mailing_address: Option<Address>,
    pub former_names: Vec<FormerName>,
    pub basic_shares: Option<i64>,
    pub diluted_shares: Option<i64>,
    pub dilution_percentage: Option<f64>,
}

impl Company {
    pub fn new(cik: String, symbol: String, security_name: String) -> Self {
        Self {
            cik,
            symbol,
            security_name,
            entity_type: None,
            sic: None,
            sic_description: None,
            ein: None,
            description: None,
            website: None,
            investor_website: None,
            category: None,
            fiscal_year_end: None,
            state_of_incorporation: None,
            state_of_incorporation_description: None,
            phone: None,
            flags: None,
            exchanges: vec![],
            business_address: None,
            mailing_address: None,
            former_names: vec![],
            basic_shares: None,
            diluted_shares: None,
            dilution_percentage: None,
        }
    }
}

impl Record for Company {
    const TABLE: Table = sql::COMPANIES;

    fn key(&self) -> &str {
        &self.cik
    }
}

/// A postal address from the submissions file; read in camelCase, stored in snake_case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"), default)]
pub struct Address {
    pub street1: Option<String>,
    pub street2: Option<String>,
    pub city: Option<String>,
    pub state_or_country: Option<String>,
    pub state_or_country_description: Option<String>,
    pub zip_code: Option<String>,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self == &Address::default()
    }
}

/// A name the filer used to go by, between `from` and `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormerName {
    pub name: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
