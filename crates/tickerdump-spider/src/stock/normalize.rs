use super::model::Stock;
use std::collections::HashMap;
use tracing::warn;

/// One directory row: normalized header → raw cell.
pub type Row = HashMap<String, String>;

/// Round lot used when the column is missing or unreadable.
pub const DEFAULT_ROUND_LOT: i32 = 100;

/// The only cell value read as `true` in the directory's flag columns.
pub const TRUTH_MARKER: &str = "Y";

/// Why a row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("round lot size must be a positive whole number, found {0:?}")]
    InvalidRoundLot(String),
}

/// `" Round Lot Size "` → `"round_lot_size"`.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Where a record's exchange comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeField {
    Column(&'static str),
    Fixed(&'static str),
}

/// Declarative mapping of one directory file format onto [`Stock`].
///
/// Every column named here is optional in the input; the required ones are enforced in
/// [`FieldMap::normalize`], everything else falls back to `None`, `false`, or
/// [`DEFAULT_ROUND_LOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub symbol: &'static str,
    pub security_name: &'static str,
    pub exchange: ExchangeField,
    pub market_category: Option<&'static str>,
    pub financial_status: Option<&'static str>,
    pub cqs_symbol: Option<&'static str>,
    pub test_issue: &'static str,
    pub etf: &'static str,
    pub next_shares: Option<&'static str>,
    pub round_lot_size: &'static str,
}

// Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
/// `nasdaqlisted.txt`
pub const NASDAQ_LISTED: FieldMap = FieldMap {
    symbol: "symbol",
    security_name: "security_name",
    exchange: ExchangeField::Fixed("NASDAQ"),
    market_category: Some("market_category"),
    financial_status: Some("financial_status"),
    cqs_symbol: None,
    test_issue: "test_issue",
    etf: "etf",
    next_shares: Some("nextshares"),
    round_lot_size: "round_lot_size",
};

// ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol
/// `otherlisted.txt`
pub const OTHER_LISTED: FieldMap = FieldMap {
    symbol: "act_symbol",
    security_name: "security_name",
    exchange: ExchangeField::Column("exchange"),
    market_category: None,
    financial_status: None,
    cqs_symbol: Some("cqs_symbol"),
    test_issue: "test_issue",
    etf: "etf",
    next_shares: None,
    round_lot_size: "round_lot_size",
};

impl FieldMap {
    /// Map a row onto a [`Stock`], or say why it can't be stored.
    pub fn normalize(&self, row: &Row) -> Result<Stock, Rejection> {
        let symbol = text(row, self.symbol).ok_or(Rejection::MissingField("symbol"))?;
        let security_name =
            text(row, self.security_name).ok_or(Rejection::MissingField("security_name"))?;
        let exchange = match self.exchange {
            ExchangeField::Fixed(exchange) => exchange.to_string(),
            ExchangeField::Column(column) => {
                text(row, column).ok_or(Rejection::MissingField("exchange"))?
            }
        };
        let round_lot_size = round_lot(row, self.round_lot_size)?;

        Ok(Stock {
            id: Stock::composite_id(&symbol, &exchange),
            symbol,
            security_name,
            exchange,
            market_category: self.market_category.and_then(|column| text(row, column)),
            test_issue: flag(row, self.test_issue),
            financial_status: self.financial_status.and_then(|column| text(row, column)),
            round_lot_size,
            etf: flag(row, self.etf),
            next_shares: self.next_shares.map_or(false, |column| flag(row, column)),
            cqs_symbol: self.cqs_symbol.and_then(|column| text(row, column)),
        })
    }
}

// trimmed, non-empty cell
fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
}

fn flag(row: &Row, column: &str) -> bool {
    text(row, column).as_deref() == Some(TRUTH_MARKER)
}

fn round_lot(row: &Row, column: &str) -> Result<i32, Rejection> {
    let Some(cell) = text(row, column) else {
        return Ok(DEFAULT_ROUND_LOT);
    };

    // whole numbers only, "100.0" included
    let size = match cell.parse::<i64>() {
        Ok(size) => Some(size),
        Err(_) => match cell.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
            Ok(_) => return Err(Rejection::InvalidRoundLot(cell)),
            Err(_) => None,
        },
    };

    match size {
        None => {
            warn!("unreadable round lot size {cell:?}, using {DEFAULT_ROUND_LOT}");
            Ok(DEFAULT_ROUND_LOT)
        }
        Some(size) if size <= 0 => Err(Rejection::InvalidRoundLot(cell)),
        Some(size) => i32::try_from(size).map_err(|_| Rejection::InvalidRoundLot(cell)),
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn headers_are_snake_cased() {
        assert_eq!(normalize_header(" Round Lot Size "), "round_lot_size");
        assert_eq!(normalize_header("ACT Symbol"), "act_symbol");
        assert_eq!(normalize_header("NextShares"), "nextshares");
    }

    #[test]
    fn nasdaq_row_maps_every_field() {
        let stock = NASDAQ_LISTED
            .normalize(&row(&[
                ("symbol", "AAPL"),
                ("security_name", "Apple Inc. - Common Stock"),
                ("market_category", "Q"),
                ("test_issue", "N"),
                ("financial_status", "N"),
                ("round_lot_size", "100"),
                ("etf", "N"),
                ("nextshares", "Y"),
            ]))
            .unwrap();

        assert_eq!(stock.id, "AAPL:NASDAQ");
        assert_eq!(stock.exchange, "NASDAQ");
        assert_eq!(stock.market_category.as_deref(), Some("Q"));
        assert_eq!(stock.financial_status.as_deref(), Some("N"));
        assert_eq!(stock.cqs_symbol, None);
        assert!(!stock.test_issue);
        assert!(!stock.etf);
        assert!(stock.next_shares);
        assert_eq!(stock.round_lot_size, 100);
    }

    #[test]
    fn other_listed_row_keys_on_its_exchange() {
        let stock = OTHER_LISTED
            .normalize(&row(&[
                ("act_symbol", "SPY"),
                ("security_name", "SPDR S&P 500 ETF Trust"),
                ("exchange", "P"),
                ("cqs_symbol", "SPY"),
                ("etf", "Y"),
                ("round_lot_size", "100"),
                ("test_issue", "N"),
            ]))
            .unwrap();

        assert_eq!(stock.id, "SPY:P");
        assert_eq!(stock.cqs_symbol.as_deref(), Some("SPY"));
        assert!(stock.etf);
        assert!(!stock.next_shares);
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let no_name = row(&[("symbol", "AAPL"), ("security_name", "  ")]);
        assert_eq!(
            NASDAQ_LISTED.normalize(&no_name),
            Err(Rejection::MissingField("security_name"))
        );

        let no_exchange = row(&[("act_symbol", "SPY"), ("security_name", "SPDR")]);
        assert_eq!(
            OTHER_LISTED.normalize(&no_exchange),
            Err(Rejection::MissingField("exchange"))
        );

        assert_eq!(
            NASDAQ_LISTED.normalize(&Row::new()),
            Err(Rejection::MissingField("symbol"))
        );
    }

    #[test]
    fn round_lot_defaults_but_never_coerces() {
        let base = [("symbol", "ZZZ"), ("security_name", "Zed")];

        let missing = NASDAQ_LISTED.normalize(&row(&base)).unwrap();
        assert_eq!(missing.round_lot_size, DEFAULT_ROUND_LOT);

        let garbage = NASDAQ_LISTED
            .normalize(&row(&[base[0], base[1], ("round_lot_size", "lots")]))
            .unwrap();
        assert_eq!(garbage.round_lot_size, DEFAULT_ROUND_LOT);

        let float = NASDAQ_LISTED
            .normalize(&row(&[base[0], base[1], ("round_lot_size", "10.0")]))
            .unwrap();
        assert_eq!(float.round_lot_size, 10);

        assert_eq!(
            NASDAQ_LISTED.normalize(&row(&[base[0], base[1], ("round_lot_size", "0")])),
            Err(Rejection::InvalidRoundLot("0".into()))
        );
    }

    #[test]
    fn round_lot_out_of_range_or_fractional_is_rejected() {
        let base = [("symbol", "ZZZ"), ("security_name", "Zed")];
        for cell in ["0.5", "99999999999", "-100", "1.5"] {
            assert_eq!(
                NASDAQ_LISTED.normalize(&row(&[base[0], base[1], ("round_lot_size", cell)])),
                Err(Rejection::InvalidRoundLot(cell.into())),
                "round lot cell {cell:?}"
            );
        }
    }

    #[test]
    fn only_the_truth_marker_is_true() {
        let cells = [("Y", true), ("y", false), ("N", false), ("", false), ("Yes", false)];
        for (cell, expected) in cells {
            let stock = NASDAQ_LISTED
                .normalize(&row(&[("symbol", "A"), ("security_name", "A"), ("etf", cell)]))
                .unwrap();
            assert_eq!(stock.etf, expected, "etf cell {cell:?}");
        }
    }

    #[test]
    fn same_row_same_key() {
        let input = row(&[
            ("act_symbol", "BRK.A"),
            ("security_name", "Berkshire"),
            ("exchange", "N"),
        ]);
        let first = OTHER_LISTED.normalize(&input).unwrap();
        let second = OTHER_LISTED.normalize(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id, "BRK.A:N");
    }
}
