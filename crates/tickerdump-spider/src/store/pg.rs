use super::{Store, Table};
use crate::error::Error;
use async_trait::async_trait;
use deadpool_postgres::{ManagerConfig, Pool, RecyclingMethod};
use serde_json::Value;
use tracing::{debug, trace};

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn connect(url: &str) -> Result<Self, Error> {
        trace!("creating postgres connection pool config");
        let mut pg_config = deadpool_postgres::Config::new();
        pg_config.url = Some(url.to_string());
        pg_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        trace!("creating tickerdump connection pool");
        let pool = pg_config.create_pool(
            Some(deadpool_postgres::Runtime::Tokio1),
            tokio_postgres::NoTls,
        )?;
        debug!("tickerdump connection pool established");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

/// `INSERT ... SELECT` over `jsonb_populate_recordset`, so one `jsonb` array parameter carries
/// the whole batch, and `ON CONFLICT` on the key turns it into an upsert.
pub(crate) fn upsert_statement(table: &Table) -> String {
    let columns = table.columns.join(", ");
    let updates = table
        .columns
        .iter()
        .filter(|&&column| column != table.key)
        .map(|column| format!("{column} = EXCLUDED.{column}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {name} ({columns}) \
        SELECT {columns} FROM jsonb_populate_recordset(NULL::{name}, $1) \
        ON CONFLICT ({key}) DO UPDATE SET {updates}",
        name = table.name,
        key = table.key,
    )
}

#[async_trait]
impl Store for PgStore {
    async fn upsert(&self, table: &Table, rows: &[Value]) -> Result<(), Error> {
        if rows.is_empty() {
            return Ok(());
        }

        let pg_client = self.pool.get().await?;
        let statement = pg_client.prepare_cached(&upsert_statement(table)).await?;
        let batch = Value::Array(rows.to_vec());
        let affected = pg_client.execute(&statement, &[&batch]).await?;
        trace!("upserted {affected} rows into {}", table.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::model::Stock;
    use crate::store::Record;
    use dotenv::var;

    #[test]
    fn statement_updates_every_column_but_the_key() {
        const PAIRS: Table = Table {
            name: "pairs",
            key: "id",
            columns: &["id", "base", "quote"],
        };

        assert_eq!(
            upsert_statement(&PAIRS),
            "INSERT INTO pairs (id, base, quote) \
            SELECT id, base, quote FROM jsonb_populate_recordset(NULL::pairs, $1) \
            ON CONFLICT (id) DO UPDATE SET base = EXCLUDED.base, quote = EXCLUDED.quote"
        );
    }

    // needs a live database: STORE_URL=postgres://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn upsert_is_idempotent() {
        let store = PgStore::connect(&var("STORE_URL").expect("environment variable STORE_URL"))
            .unwrap();
        let pg_client = store.pool().get().await.unwrap();
        pg_client
            .batch_execute(include_str!("../../../../sql/schema.sql"))
            .await
            .unwrap();

        let stock = Stock {
            id: "TDTEST:NASDAQ".into(),
            symbol: "TDTEST".into(),
            security_name: "Tickerdump Test Issue".into(),
            exchange: "NASDAQ".into(),
            market_category: Some("Q".into()),
            test_issue: true,
            financial_status: None,
            round_lot_size: 100,
            etf: false,
            next_shares: false,
            cqs_symbol: None,
        };
        let row = serde_json::to_value(&stock).unwrap();
        store.upsert(&Stock::TABLE, &[row.clone()]).await.unwrap();
        store.upsert(&Stock::TABLE, &[row]).await.unwrap();

        let renamed = Stock {
            security_name: "Tickerdump Test Issue, Renamed".into(),
            ..stock
        };
        let row = serde_json::to_value(&renamed).unwrap();
        store.upsert(&Stock::TABLE, &[row]).await.unwrap();

        let rows = pg_client
            .query(
                "SELECT security_name FROM stocks WHERE id = $1",
                &[&renamed.key()],
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<_, String>(0), renamed.security_name);

        pg_client
            .execute("DELETE FROM stocks WHERE id = $1", &[&renamed.key()])
            .await
            .unwrap();
    }
}
