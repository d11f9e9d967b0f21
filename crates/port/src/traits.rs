//! The `RowStore` trait — the contract every persistence backend must fulfil.

use async_trait::async_trait;
use uuid::Uuid;

use crate::row::{Filter, Order, Row, Table};
use crate::StoreError;

/// The core persistence trait.
///
/// The backend owns row identity and timestamps: `insert` assigns `id` and
/// `created_at`/`updated_at`, and `update` refreshes `updated_at`.  The
/// engine never fabricates either.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Insert `fields` as a new row and return the stored row, including
    /// the backend-assigned `id` and timestamps.
    async fn insert(&self, table: Table, fields: Row) -> Result<Row, StoreError>;

    /// Return all rows matching `filter` (all rows when `None`), sorted by
    /// `order` when given.
    async fn select_where(
        &self,
        table: Table,
        filter: Option<Filter>,
        order: Option<Order>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Merge `fields` into the row with the given id and return the updated
    /// row.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the row does not exist.
    async fn update(&self, table: Table, id: Uuid, fields: Row) -> Result<Row, StoreError>;

    /// Delete the row with the given id.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if nothing was deleted.
    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError>;

    /// Apply a batch of per-row patches.
    ///
    /// The default implementation applies the patches sequentially, so a
    /// failure mid-list leaves earlier patches in place.  A transactional
    /// backend should override this with a single atomic write; callers
    /// must not assume more atomicity than their backend provides.
    async fn update_many(
        &self,
        table: Table,
        patches: Vec<(Uuid, Row)>,
    ) -> Result<(), StoreError> {
        for (id, fields) in patches {
            self.update(table, id, fields).await?;
        }
        Ok(())
    }
}
