//! Row-level vocabulary for the persistence port.
//!
//! Rows cross the port boundary as plain JSON objects; the typed view of a
//! row lives in the `store` crate.  Filters are single-column equality —
//! the only shape the stores need (lookup by id, list by parent id).

use serde_json::Value;
use uuid::Uuid;

/// A row as the port sees it: a flat JSON object.
pub type Row = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// The tables the engine persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    WorkflowTemplates,
    TemplateStages,
    TemplateTasks,
    ClientProjects,
    ProjectStages,
    ProjectTasks,
}

impl Table {
    /// Stable table name, as a relational backend would spell it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WorkflowTemplates => "workflow_templates",
            Self::TemplateStages    => "template_stages",
            Self::TemplateTasks     => "template_tasks",
            Self::ClientProjects    => "client_projects",
            Self::ProjectStages     => "project_stages",
            Self::ProjectTasks      => "project_tasks",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Single-column equality filter.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

impl Filter {
    /// Match rows whose `column` equals `value`.
    pub fn eq(column: &'static str, value: Value) -> Self {
        Self { column, value }
    }

    /// Match rows whose `column` holds the given id.
    ///
    /// Ids are stored as their hyphenated string form, which is also how
    /// serde serializes `Uuid` fields inside a row.
    pub fn key(column: &'static str, id: Uuid) -> Self {
        Self::eq(column, Value::String(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Single-column ordering.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self { column, descending: false }
    }

    pub fn desc(column: &'static str) -> Self {
        Self { column, descending: true }
    }
}
