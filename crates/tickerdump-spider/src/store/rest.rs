use super::{Store, Table};
use crate::error::Error;
use crate::http::*;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::{error, trace};

// merge on the `on_conflict` column instead of failing on it, and skip echoing the rows back
const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";

/// A PostgREST endpoint (Supabase's `/rest/v1`), authenticated with an API key.
pub struct RestStore {
    client: HttpClient,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: &str, key: &str) -> Result<Self, Error> {
        let invalid = |_| Error::Config("STORE_KEY is not a valid header value".to_string());

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(invalid)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static(PREFER_UPSERT));

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, table: &Table) -> String {
        format!(
            "{}/rest/v1/{}?on_conflict={}",
            self.base_url, table.name, table.key
        )
    }
}

#[async_trait]
impl Store for RestStore {
    async fn upsert(&self, table: &Table, rows: &[Value]) -> Result<(), Error> {
        if rows.is_empty() {
            return Ok(());
        }

        let url = self.endpoint(table);
        trace!("POST {} rows to {url}", rows.len());
        let response = self.client.post(&url).json(rows).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("failed to upsert into {}, status({status}), error({body})", table.name);
            return Err(Error::Store(format!("{}: HTTP {status} {body}", table.name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::model::Company;
    use crate::store::Record;

    #[test]
    fn endpoint_upserts_on_the_table_key() {
        let store = RestStore::new("https://project.supabase.co/", "service-role-key").unwrap();
        assert_eq!(
            store.endpoint(&Company::TABLE),
            "https://project.supabase.co/rest/v1/companies?on_conflict=cik"
        );
    }

    #[test]
    fn key_must_fit_in_a_header() {
        assert!(matches!(
            RestStore::new("https://project.supabase.co", "bad\nkey"),
            Err(Error::Config(_))
        ));
    }
}
