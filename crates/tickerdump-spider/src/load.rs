use crate::store::{Record, Store, Table};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, warn};

/// Rows per upsert unless configured otherwise.
pub const BATCH_SIZE: usize = 1000;

/// What a load wrote and what it had to skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub written: usize,
    pub failed: usize,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.written + self.failed
    }
}

impl std::ops::AddAssign for LoadReport {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.failed += other.failed;
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} written, {} failed", self.written, self.failed)
    }
}

/// Upsert `records` in batches of `batch_size`.
///
/// A batch the store refuses is retried one record at a time; a record refused on its own is
/// logged by key and skipped. Nothing here returns an error.
pub async fn load<R: Record>(store: &dyn Store, records: &[R], batch_size: usize) -> LoadReport {
    let table = R::TABLE;
    let mut report = LoadReport::default();

    for (n, batch) in records.chunks(batch_size.max(1)).enumerate() {
        let mut rows = Vec::with_capacity(batch.len());
        let mut keys = Vec::with_capacity(batch.len());
        for record in batch {
            match serde_json::to_value(record) {
                Ok(row) => {
                    rows.push(row);
                    keys.push(record.key());
                }
                Err(err) => {
                    error!(
                        "failed to serialize {} {}, error({err})",
                        table.name,
                        record.key()
                    );
                    report.failed += 1;
                }
            }
        }

        match store.upsert(&table, &rows).await {
            Ok(()) => {
                debug!("{} batch {n}: {} rows upserted", table.name, rows.len());
                report.written += rows.len();
            }
            Err(err) => {
                warn!(
                    "{} batch {n} failed, falling back to single upserts, error({err})",
                    table.name
                );
                report += load_one_by_one(store, &table, rows, &keys).await;
            }
        }
    }

    report
}

async fn load_one_by_one(
    store: &dyn Store,
    table: &Table,
    rows: Vec<Value>,
    keys: &[&str],
) -> LoadReport {
    let mut report = LoadReport::default();
    for (row, key) in rows.into_iter().zip(keys) {
        match store.upsert(table, std::slice::from_ref(&row)).await {
            Ok(()) => report.written += 1,
            Err(err) => {
                error!("failed to upsert {} {key}, error({err})", table.name);
                report.failed += 1;
            }
        }
    }
    report
}
