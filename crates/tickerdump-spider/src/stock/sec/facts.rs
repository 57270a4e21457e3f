use crate::stock::common::convert_date_type;
use crate::stock::model::Company;
use chrono::NaiveDate;
use serde_json::Value;

pub const FACTS_URL: &str = "https://data.sec.gov/api/xbrl/companyfacts";

/// JSON pointer to the basic weighted-average share series.
pub const BASIC_SHARES: &str =
    "/facts/us-gaap/WeightedAverageNumberOfSharesOutstandingBasic/units/shares";

/// JSON pointer to the diluted weighted-average share series.
pub const DILUTED_SHARES: &str =
    "/facts/us-gaap/WeightedAverageNumberOfDilutedSharesOutstanding/units/shares";

// Input
// =====
//
// {
//    "cik": 320193,
//    "entityName": "Apple Inc.",
//    "facts": {
//          "us-gaap": {
//              "WeightedAverageNumberOfSharesOutstandingBasic": {
//                  "label": "Weighted Average Number of Shares Outstanding, Basic",
//                  "units": {
//                      "shares": [
//                          {
//                              "start": "2022-09-25",
//                              "end": "2023-09-30",
//                              "val": 15744231000,
//                              "accn": "0000320193-23-000106",
//                              "fy": 2023,
//                              "fp": "FY",
//                              "form": "10-K",
//                              "filed": "2023-11-03",
//                              "frame": "CY2023"
//                          },
//                          ...
//                      ]
//                  }
//              },
//              "WeightedAverageNumberOfDilutedSharesOutstanding": { ... },
//              ...
//          },
//          "dei": { ... }
//      }
// }
//
// Any level of this may be missing; the facts file is read as a loose `Value` for that reason.

/// The most recent basic and diluted weighted-average share counts of a filer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShareCounts {
    pub basic: Option<i64>,
    pub diluted: Option<i64>,
}

impl ShareCounts {
    pub fn from_facts(facts: &Value) -> Self {
        Self {
            basic: latest_value(facts, BASIC_SHARES),
            diluted: latest_value(facts, DILUTED_SHARES),
        }
    }

    pub fn dilution_percentage(&self) -> Option<f64> {
        dilution_percentage(self.basic, self.diluted)
    }
}

/// The value of the latest reported cell of the series at `pointer`: latest period `end`, then
/// latest `filed`, then last listed. `None` if anything on the way is missing.
pub fn latest_value(facts: &Value, pointer: &str) -> Option<i64> {
    let date = |cell: &Value, key: &str| -> Option<NaiveDate> {
        cell.get(key)
            .and_then(Value::as_str)
            .and_then(|s| convert_date_type(s).ok())
    };

    facts
        .pointer(pointer)?
        .as_array()?
        .iter()
        .filter_map(|cell| {
            let val = cell.get("val")?;
            let val = val
                .as_i64()
                .or_else(|| val.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))?;
            Some(((date(cell, "end"), date(cell, "filed")), val))
        })
        .max_by_key(|(reported, _)| *reported)
        .map(|(_, val)| val)
}

/// `(diluted - basic) / basic * 100`, when both are known and `basic` is positive.
///
/// ```rust
/// use tickerdump_spider::stock::sec::facts::dilution_percentage;
///
/// assert_eq!(dilution_percentage(Some(100), Some(110)), Some(10.0));
/// assert_eq!(dilution_percentage(Some(0), Some(110)), None);
/// assert_eq!(dilution_percentage(None, Some(110)), None);
/// ```
pub fn dilution_percentage(basic: Option<i64>, diluted: Option<i64>) -> Option<f64> {
    match (basic, diluted) {
        (Some(basic), Some(diluted)) if basic > 0 => {
            Some((diluted as f64 - basic as f64) / basic as f64 * 100.0)
        }
        _ => None,
    }
}

impl Company {
    /// A copy of this company carrying the share counts, with its dilution recalculated.
    /// Counts the facts did not report keep their previous value.
    pub fn with_share_counts(&self, counts: ShareCounts) -> Company {
        let basic_shares = counts.basic.or(self.basic_shares);
        let diluted_shares = counts.diluted.or(self.diluted_shares);
        Company {
            basic_shares,
            diluted_shares,
            dilution_percentage: dilution_percentage(basic_shares, diluted_shares),
            ..self.clone()
        }
    }
}
