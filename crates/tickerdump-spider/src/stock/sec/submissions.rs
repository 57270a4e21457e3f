use crate::stock::common::de_date;
use crate::stock::model::{Address, Company, FormerName};
use chrono::NaiveDate;
use serde::Deserialize;

pub const SUBMISSIONS_URL: &str = "https://data.sec.gov/submissions";

// Input
// =====
//
// {
//     "cik": "320193",
//     "entityType": "operating",
//     "sic": "3571",
//     "sicDescription": "Electronic Computers",
//     "name": "Apple Inc.",
//     "tickers": ["AAPL"],
//     "exchanges": ["Nasdaq"],
//     "ein": "942404110",
//     "description": "",
//     "website": "",
//     "investorWebsite": "",
//     "category": "Large Accelerated Filer",
//     "fiscalYearEnd": "0928",
//     "stateOfIncorporation": "CA",
//     "stateOfIncorporationDescription": "CA",
//     "addresses": {
//         "mailing": { "street1": "ONE APPLE PARK WAY", "street2": null, "city": "CUPERTINO", ... },
//         "business": { ... }
//     },
//     "phone": "(408) 996-1010",
//     "flags": "",
//     "formerNames": [
//         { "name": "APPLE COMPUTER INC", "from": "1994-01-26T05:00:00.000Z", "to": "2007-01-04T05:00:00.000Z" }
//     ],
//     "filings": { ... }
// }
/// The parts of a submissions file that describe the filer. Every field may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    pub entity_type: Option<String>,
    pub sic: Option<String>,
    pub sic_description: Option<String>,
    pub name: Option<String>,
    pub exchanges: Option<Vec<Option<String>>>,
    pub ein: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub investor_website: Option<String>,
    pub category: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub state_of_incorporation: Option<String>,
    pub state_of_incorporation_description: Option<String>,
    pub addresses: Option<Addresses>,
    pub phone: Option<String>,
    pub flags: Option<String>,
    pub former_names: Option<Vec<RawFormerName>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Addresses {
    pub mailing: Option<Address>,
    pub business: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawFormerName {
    pub name: Option<String>,
    #[serde(deserialize_with = "de_date")]
    pub from: Option<NaiveDate>,
    #[serde(deserialize_with = "de_date")]
    pub to: Option<NaiveDate>,
}

// the SEC sends "" for most unknown fields
fn present(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn address(address: Option<Address>) -> Option<Address> {
    address.filter(|a| !a.is_empty())
}

impl Company {
    /// A copy of this company with the submission's descriptive fields merged in.
    ///
    /// Identity fields (`cik`, `symbol`, `security_name`) are kept as they are; a field the
    /// submission leaves blank keeps whatever this company already had.
    pub fn with_submission(&self, submission: Submission) -> Company {
        let current = self.clone();
        let addresses = submission.addresses.unwrap_or_default();

        let exchanges: Vec<String> = submission
            .exchanges
            .unwrap_or_default()
            .into_iter()
            .filter_map(present)
            .collect();

        let former_names: Vec<FormerName> = submission
            .former_names
            .unwrap_or_default()
            .into_iter()
            .filter_map(|former| {
                present(former.name).map(|name| FormerName {
                    name,
                    from: former.from,
                    to: former.to,
                })
            })
            .collect();

        Company {
            entity_type: present(submission.entity_type).or(current.entity_type),
            sic: present(submission.sic).or(current.sic),
            sic_description: present(submission.sic_description).or(current.sic_description),
            ein: present(submission.ein).or(current.ein),
            description: present(submission.description).or(current.description),
            website: present(submission.website).or(current.website),
            investor_website: present(submission.investor_website).or(current.investor_website),
            category: present(submission.category).or(current.category),
            fiscal_year_end: present(submission.fiscal_year_end).or(current.fiscal_year_end),
            state_of_incorporation: present(submission.state_of_incorporation)
                .or(current.state_of_incorporation),
            state_of_incorporation_description: present(
                submission.state_of_incorporation_description,
            )
            .or(current.state_of_incorporation_description),
            phone: present(submission.phone).or(current.phone),
            flags: present(submission.flags).or(current.flags),
            exchanges: if exchanges.is_empty() {
                current.exchanges
            } else {
                exchanges
            },
            business_address: address(addresses.business).or(current.business_address),
            mailing_address: address(addresses.mailing).or(current.mailing_address),
            former_names: if former_names.is_empty() {
                current.former_names
            } else {
                former_names
            },
            ..current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPLE_JSON: &str = r#"{
        "cik": "320193",
        "entityType": "operating",
        "sic": "3571",
        "sicDescription": "Electronic Computers",
        "name": "Apple Inc.",
        "tickers": ["AAPL"],
        "exchanges": ["Nasdaq", null],
        "ein": "942404110",
        "description": "",
        "website": "",
        "category": "Large Accelerated Filer",
        "fiscalYearEnd": "0928",
        "stateOfIncorporation": "CA",
        "addresses": {
            "mailing": {"street1": "ONE APPLE PARK WAY", "street2": null, "city": "CUPERTINO",
                        "stateOrCountry": "CA", "zipCode": "95014", "stateOrCountryDescription": "CA"},
            "business": {"street1": null, "city": null}
        },
        "phone": "(408) 996-1010",
        "flags": "",
        "formerNames": [
            {"name": "APPLE COMPUTER INC", "from": "1994-01-26T05:00:00.000Z", "to": "2007-01-04T05:00:00.000Z"},
            {"name": "", "from": null, "to": null}
        ],
        "filings": {"recent": {}}
    }"#;

    #[test]
    fn submission_merges_into_a_new_company() {
        let submission: Submission = serde_json::from_str(APPLE_JSON).unwrap();
        let base = Company::new("0000320193".into(), "AAPL".into(), "Apple Inc.".into());
        let enriched = base.with_submission(submission);

        // the base is untouched
        assert_eq!(base.sic, None);

        assert_eq!(enriched.cik, base.cik);
        assert_eq!(enriched.symbol, "AAPL");
        assert_eq!(enriched.entity_type.as_deref(), Some("operating"));
        assert_eq!(enriched.sic.as_deref(), Some("3571"));
        assert_eq!(enriched.description, None);
        assert_eq!(enriched.flags, None);
        assert_eq!(enriched.exchanges, vec!["Nasdaq".to_string()]);
        assert_eq!(
            enriched.mailing_address.as_ref().and_then(|a| a.city.as_deref()),
            Some("CUPERTINO")
        );
        assert_eq!(enriched.business_address, None);
        assert_eq!(enriched.former_names.len(), 1);
        assert_eq!(enriched.former_names[0].name, "APPLE COMPUTER INC");
        assert_eq!(
            enriched.former_names[0].to,
            NaiveDate::from_ymd_opt(2007, 1, 4)
        );
    }

    #[test]
    fn empty_submission_changes_nothing() {
        let submission: Submission = serde_json::from_str("{}").unwrap();
        let mut base = Company::new("0000000001".into(), "X".into(), "X Corp".into());
        base.sic = Some("1000".into());

        assert_eq!(base.with_submission(submission), base);
    }
}
