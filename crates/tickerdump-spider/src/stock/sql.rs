use crate::store::Table;

//////////////////////////////////////////////////////////////////
// stocks
//////////////////////////////////////////////////////////////////

/// `stocks` is the master table of directory listings, one row per symbol and exchange.
pub(crate) const STOCKS: Table = Table {
    name: "stocks",
    key: "id",
    columns: &[
        "id",
        "symbol",
        "security_name",
        "exchange",
        "market_category",
        "test_issue",
        "financial_status",
        "round_lot_size",
        "etf",
        "next_shares",
        "cqs_symbol",
    ],
};

//////////////////////////////////////////////////////////////////
// companies
//////////////////////////////////////////////////////////////////

/// `companies` holds SEC filers with their submission metadata and weighted share counts.
/// Addresses, exchanges, and former names are `jsonb`.
pub(crate) const COMPANIES: Table = Table {
    name: "companies",
    key: "cik",
    columns: &[
        "cik",
        "symbol",
        "security_name",
        "entity_type",
        "sic",
        "sic_description",
        "ein",
        "description",
        "website",
        "investor_website",
        "category",
        "fiscal_year_end",
        "state_of_incorporation",
        "state_of_incorporation_description",
        "phone",
        "flags",
        "exchanges",
        "business_address",
        "mailing_address",
        "former_names",
        "basic_shares",
        "diluted_shares",
        "dilution_percentage",
    ],
};
