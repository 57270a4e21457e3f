use super::{Store, Table};
use crate::error::Error;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

type Rows = BTreeMap<String, Value>;

/// Tables held in memory, keyed the same way the real backends key them.
///
/// Failure modes can be switched on to exercise the loader: `failing_batches` refuses every
/// write of more than one row, `rejecting` refuses any write containing the given key.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, Rows>>,
    fail_batches: bool,
    rejected: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_batches(mut self) -> Self {
        self.fail_batches = true;
        self
    }

    pub fn rejecting(mut self, key: &str) -> Self {
        self.rejected.insert(key.to_string());
        self
    }

    /// Every row of `table`, ordered by key.
    pub fn rows(&self, table: &Table) -> Vec<Value> {
        self.with_table(table, |rows| rows.values().cloned().collect())
    }

    pub fn get(&self, table: &Table, key: &str) -> Option<Value> {
        self.with_table(table, |rows| rows.get(key).cloned())
    }

    pub fn len(&self, table: &Table) -> usize {
        self.with_table(table, |rows| rows.len())
    }

    pub fn is_empty(&self, table: &Table) -> bool {
        self.len(table) == 0
    }

    fn with_table<T>(&self, table: &Table, f: impl FnOnce(&Rows) -> T) -> T {
        let tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match tables.get(table.name) {
            Some(rows) => f(rows),
            None => f(&Rows::new()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert(&self, table: &Table, rows: &[Value]) -> Result<(), Error> {
        if self.fail_batches && rows.len() > 1 {
            return Err(Error::Store(format!(
                "{}: batch of {} refused",
                table.name,
                rows.len()
            )));
        }

        // validate everything first so a refused write changes nothing
        let mut keyed = Vec::with_capacity(rows.len());
        for row in rows {
            let key = row
                .get(table.key)
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Store(format!("{}: row without {}", table.name, table.key)))?;
            if self.rejected.contains(key) {
                return Err(Error::Store(format!("{}: {key} refused", table.name)));
            }
            keyed.push((key.to_string(), row.clone()));
        }

        let mut tables = self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tables.entry(table.name).or_default().extend(keyed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const THINGS: Table = Table {
        name: "things",
        key: "id",
        columns: &["id", "value"],
    };

    #[tokio::test]
    async fn upsert_replaces_by_key() {
        let store = MemoryStore::new();
        store
            .upsert(&THINGS, &[json!({"id": "a", "value": 1}), json!({"id": "b", "value": 2})])
            .await
            .unwrap();
        store
            .upsert(&THINGS, &[json!({"id": "a", "value": 3})])
            .await
            .unwrap();

        assert_eq!(store.len(&THINGS), 2);
        assert_eq!(store.get(&THINGS, "a"), Some(json!({"id": "a", "value": 3})));
    }

    #[tokio::test]
    async fn refused_writes_change_nothing() {
        let store = MemoryStore::new().rejecting("b");
        let rows = [json!({"id": "a"}), json!({"id": "b"})];

        assert!(store.upsert(&THINGS, &rows).await.is_err());
        assert!(store.is_empty(&THINGS));
        assert!(store.upsert(&THINGS, &[json!({"value": 1})]).await.is_err());
    }
}
