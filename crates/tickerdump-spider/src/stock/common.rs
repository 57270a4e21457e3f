use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Width of a zero-padded Central Index Key.
pub const CIK_WIDTH: usize = 10;

/// Zero-pad a raw CIK to 10 digits; `None` when it is empty, not numeric, or too wide.
///
/// ```rust
/// use tickerdump_spider::stock::sec::pad_cik;
///
/// assert_eq!(pad_cik("320193").as_deref(), Some("0000320193"));
/// assert_eq!(pad_cik("0000320193").as_deref(), Some("0000320193"));
/// assert_eq!(pad_cik("AAPL"), None);
/// ```
pub fn pad_cik(raw: &str) -> Option<String> {
    let digits = raw.trim();
    if digits.is_empty()
        || digits.len() > CIK_WIDTH
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some(format!("{digits:0>width$}", width = CIK_WIDTH))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCik {
    Number(u64),
    Text(String),
    Other(IgnoredAny),
}

/// The SEC hands out CIKs as bare integers (`"cik_str": 320193`) in some files and as strings in
/// others; either way they come out padded, or `None` to be rejected later.
pub(crate) fn de_cik<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCik>::deserialize(deserializer)? {
        Some(RawCik::Number(n)) => pad_cik(&n.to_string()),
        Some(RawCik::Text(s)) => pad_cik(&s),
        Some(RawCik::Other(_)) | None => None,
    })
}

/// Parse the date part of `"2009-06-30"` or `"2019-08-05T04:00:00.000Z"`.
pub(crate) fn convert_date_type(str_date: &str) -> chrono::ParseResult<NaiveDate> {
    let date = str_date.get(..10).unwrap_or(str_date);
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
}

/// Lenient date field: anything unparseable becomes `None`.
pub(crate) fn de_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| convert_date_type(&s).ok()))
}
