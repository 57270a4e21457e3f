use crate::config::Config;
use crate::error::Error;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Process-local store, for dry runs and tests.
pub mod memory;

/// PostgreSQL through a `deadpool-postgres` pool.
pub mod pg;

/// PostgREST (Supabase) over HTTP.
pub mod rest;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use rest::RestStore;

/// A destination table: its name, the column rows are upserted on, and every column written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub key: &'static str,
    pub columns: &'static [&'static str],
}

/// A value with a home table and an identity inside it.
pub trait Record: Serialize + Send + Sync {
    const TABLE: Table;

    fn key(&self) -> &str;
}

/// Somewhere rows can be upserted.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace every row by `table.key`, as one write: either all rows land or the
    /// call fails.
    async fn upsert(&self, table: &Table, rows: &[Value]) -> Result<(), Error>;
}

/// The backend `STORE_URL` points at: a PostgreSQL pool for `postgres://` and
/// `postgresql://` URLs, PostgREST (authenticated with `STORE_KEY`) for anything else.
pub fn connect(config: &Config) -> Result<Box<dyn Store>, Error> {
    let url = config
        .store_url
        .as_deref()
        .ok_or_else(|| Error::Config("STORE_URL is not set".to_string()))?;

    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        debug!("connecting to PostgreSQL store");
        return Ok(Box::new(PgStore::connect(url)?));
    }

    let key = config
        .store_key
        .as_deref()
        .ok_or_else(|| Error::Config("STORE_KEY is required for a REST store".to_string()))?;
    debug!("connecting to REST store at {url}");
    Ok(Box::new(RestStore::new(url, key)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_url_is_required() {
        assert!(matches!(connect(&Config::default()), Err(Error::Config(_))));
    }

    #[test]
    fn rest_store_needs_a_key() {
        let config = Config {
            store_url: Some("https://project.supabase.co".into()),
            ..Config::default()
        };
        assert!(matches!(connect(&config), Err(Error::Config(_))));

        let config = Config {
            store_key: Some("service-role-key".into()),
            ..config
        };
        assert!(connect(&config).is_ok());
    }
}
