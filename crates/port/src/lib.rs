//! `port` crate — the persistence contract the rest of the workspace is
//! built against.
//!
//! The engine never talks to a database directly; it is handed a
//! [`RowStore`] at construction time. [`MemoryStore`] is the bundled
//! backend for tests and database-free embedding.

pub mod error;
pub mod memory;
pub mod row;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use row::{Filter, Order, Row, Table};
pub use traits::RowStore;
