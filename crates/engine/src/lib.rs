//! `engine` crate — project instantiation and the kanban board engine.
//!
//! Stateless between calls: each engine is constructed over an injected
//! [`port::RowStore`] and issues one awaited persistence call per logical
//! step.  Derived metrics are pure functions over already-loaded rows.

pub mod board;
pub mod error;
pub mod instantiate;
pub mod metrics;

pub use board::Board;
pub use error::EngineError;
pub use instantiate::{Instantiator, NewProject};
pub use metrics::{blocked_count, overdue_count, overdue_count_today, project_progress};

#[cfg(test)]
mod board_tests;
