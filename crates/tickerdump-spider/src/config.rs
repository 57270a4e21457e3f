use crate::error::Error;
use crate::http::var;
use crate::load::BATCH_SIZE;
use crate::rate_limit::RateLimitConfig;
use crate::stock::sec::enrich::{MAX_WORKERS, WORKERS};
use std::str::FromStr;
use std::time::Duration;

/// Sent with every SEC request when `USER_AGENT` is not set.
pub const DEFAULT_USER_AGENT: &str = "tickerdump admin@tickerdump.invalid";

/// Run settings, read from the environment (and `.env`).
///
/// | variable                 | default                 |
/// |--------------------------|-------------------------|
/// | `STORE_URL`              | none, required to write |
/// | `STORE_KEY`              | none                    |
/// | `MAX_ENRICH`             | all                     |
/// | `ENRICH_WORKERS`         | 2                       |
/// | `USER_AGENT`             | [`DEFAULT_USER_AGENT`]  |
/// | `BATCH_SIZE`             | 1000                    |
/// | `RATE_LIMIT_REQUESTS`    | 8                       |
/// | `RATE_LIMIT_WINDOW_SECS` | 10                      |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store_url: Option<String>,
    pub store_key: Option<String>,
    pub max_enrich: Option<usize>,
    pub workers: usize,
    pub user_agent: String,
    pub batch_size: usize,
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            store_key: None,
            max_enrich: None,
            workers: WORKERS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            batch_size: BATCH_SIZE,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| var(key).ok())
    }

    /// Build from any variable lookup; unset and blank variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let max_enrich = match get("MAX_ENRICH") {
            Some(v) if v.eq_ignore_ascii_case("all") => None,
            Some(v) => Some(parse::<usize>("MAX_ENRICH", &v)?),
            None => None,
        };

        let workers = match get("ENRICH_WORKERS") {
            Some(v) => positive("ENRICH_WORKERS", parse("ENRICH_WORKERS", &v)?)?.min(MAX_WORKERS),
            None => defaults.workers,
        };

        let batch_size = match get("BATCH_SIZE") {
            Some(v) => positive("BATCH_SIZE", parse("BATCH_SIZE", &v)?)?,
            None => defaults.batch_size,
        };

        let mut rate_limit = defaults.rate_limit;
        if let Some(v) = get("RATE_LIMIT_REQUESTS") {
            rate_limit.max_requests =
                positive("RATE_LIMIT_REQUESTS", parse("RATE_LIMIT_REQUESTS", &v)?)?;
        }
        if let Some(v) = get("RATE_LIMIT_WINDOW_SECS") {
            let secs = positive("RATE_LIMIT_WINDOW_SECS", parse("RATE_LIMIT_WINDOW_SECS", &v)?)?;
            rate_limit.window = Duration::from_secs(secs as u64);
        }

        Ok(Self {
            store_url: get("STORE_URL"),
            store_key: get("STORE_KEY"),
            max_enrich,
            workers,
            user_agent: get("USER_AGENT").unwrap_or(defaults.user_agent),
            batch_size,
            rate_limit,
        })
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{key}={value:?} is not a number")))
}

fn positive(key: &str, value: usize) -> Result<usize, Error> {
    if value == 0 {
        return Err(Error::Config(format!("{key} must be greater than zero")));
    }
    Ok(value)
}
