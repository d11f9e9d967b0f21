//! `MemoryStore` — an arena-style, in-process `RowStore`.
//!
//! Rows live in per-table maps behind one mutex.  Useful in tests and in
//! embeddings that have no database at all; it assigns ids and timestamps
//! exactly the way a hosted backend would.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::row::{Filter, Order, Row, Table};
use crate::{RowStore, StoreError};

/// One stored row plus its insertion sequence number.
///
/// The sequence number breaks ordering ties between rows whose sort column
/// holds equal values (e.g. two rows inserted within the same clock tick),
/// keeping listings deterministic.
struct StoredRow {
    seq: u64,
    fields: Row,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<Table, HashMap<Uuid, StoredRow>>,
    next_seq: u64,
}

/// In-memory persistence backend.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in `table`.
    pub fn row_count(&self, table: Table) -> usize {
        let inner = self.inner.lock().expect("memory store poisoned");
        inner.tables.get(&table).map_or(0, HashMap::len)
    }
}

/// Ordering over the JSON scalar types a sort column can hold.
///
/// Timestamps are RFC 3339 strings and dates are `YYYY-MM-DD`, so string
/// comparison is chronological for them.
fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn insert(&self, table: Table, mut fields: Row) -> Result<Row, StoreError> {
        let id = Uuid::new_v4();
        let now = serde_json::to_value(Utc::now())?;

        fields.insert("id".into(), Value::String(id.to_string()));
        fields.insert("created_at".into(), now.clone());
        fields.insert("updated_at".into(), now);

        let mut inner = self.inner.lock().expect("memory store poisoned");
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .tables
            .entry(table)
            .or_default()
            .insert(id, StoredRow { seq, fields: fields.clone() });

        Ok(fields)
    }

    async fn select_where(
        &self,
        table: Table,
        filter: Option<Filter>,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError> {
        let inner = self.inner.lock().expect("memory store poisoned");
        let Some(rows) = inner.tables.get(&table) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&StoredRow> = rows
            .values()
            .filter(|row| match &filter {
                Some(f) => row.fields.get(f.column).unwrap_or(&Value::Null) == &f.value,
                None => true,
            })
            .collect();

        match &order {
            Some(o) => matched.sort_by(|a, b| {
                let by_column = cmp_values(
                    a.fields.get(o.column).unwrap_or(&Value::Null),
                    b.fields.get(o.column).unwrap_or(&Value::Null),
                )
                .then(a.seq.cmp(&b.seq));
                if o.descending { by_column.reverse() } else { by_column }
            }),
            None => matched.sort_by_key(|row| row.seq),
        }

        Ok(matched.into_iter().map(|row| row.fields.clone()).collect())
    }

    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<Row, StoreError> {
        let now = serde_json::to_value(Utc::now())?;

        let mut inner = self.inner.lock().expect("memory store poisoned");
        let row = inner
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.get_mut(&id))
            .ok_or(StoreError::NotFound)?;

        for (key, value) in fields {
            row.fields.insert(key, value);
        }
        row.fields.insert("updated_at".into(), now);

        Ok(row.fields.clone())
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("memory store poisoned");
        inner
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.remove(&id))
            .ok_or(StoreError::NotFound)?;
        Ok(())
    }

    /// All-or-nothing: every id is checked before the first patch lands.
    async fn update_many(
        &self,
        table: Table,
        patches: Vec<(Uuid, Row)>,
    ) -> Result<(), StoreError> {
        let now = serde_json::to_value(Utc::now())?;

        let mut inner = self.inner.lock().expect("memory store poisoned");
        let rows = inner.tables.entry(table).or_default();

        if patches.iter().any(|(id, _)| !rows.contains_key(id)) {
            return Err(StoreError::NotFound);
        }

        for (id, fields) in patches {
            let row = rows.get_mut(&id).ok_or(StoreError::NotFound)?;
            for (key, value) in fields {
                row.fields.insert(key, value);
            }
            row.fields.insert("updated_at".into(), now.clone());
        }

        Ok(())
    }
}
