//! Row structs that map 1-to-1 onto the persisted tables.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Instantiation and board semantics live in the `engine` crate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workflow_templates
// ---------------------------------------------------------------------------

/// A reusable pipeline blueprint, not tied to any client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// template_stages
// ---------------------------------------------------------------------------

/// An ordered stage within a template.
///
/// `position` is 0-based and dense: a template's stages form a total order
/// with no gaps when listed ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateStage {
    pub id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// template_tasks
// ---------------------------------------------------------------------------

/// An ordered task within a template stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateTask {
    pub id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// client_projects
// ---------------------------------------------------------------------------

/// The kind of engagement a project represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Content,
    LandingPage,
    Automation,
    Website,
    Campaign,
    Other,
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content     => write!(f, "content"),
            Self::LandingPage => write!(f, "landing_page"),
            Self::Automation  => write!(f, "automation"),
            Self::Website     => write!(f, "website"),
            Self::Campaign    => write!(f, "campaign"),
            Self::Other       => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for ProjectType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content"      => Ok(Self::Content),
            "landing_page" => Ok(Self::LandingPage),
            "automation"   => Ok(Self::Automation),
            "website"      => Ok(Self::Website),
            "campaign"     => Ok(Self::Campaign),
            "other"        => Ok(Self::Other),
            other          => Err(format!("unknown project type: {other}")),
        }
    }
}

/// Operator-driven project lifecycle; there are no automatic transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active    => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Archived  => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active"    => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived"  => Ok(Self::Archived),
            other       => Err(format!("unknown project status: {other}")),
        }
    }
}

/// A client-specific project, cloned from a template or started blank.
///
/// `client_id` references an external client entity and is opaque to this
/// store.  `template_id` is provenance only: the clone shares no mutable
/// identity with its source template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProject {
    pub id: Uuid,
    pub client_id: String,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    pub name: String,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// project_stages
// ---------------------------------------------------------------------------

/// A kanban column of a project.
///
/// Exactly one stage of a project carries `is_terminal = true`: the
/// highest-position stage, whose tasks count as completed for progress
/// metrics.  The stores re-derive the flag whenever stages are created or
/// repositioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub position: i32,
    #[serde(default)]
    pub is_terminal: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// project_tasks
// ---------------------------------------------------------------------------

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low    => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High   => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low"    => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high"   => Ok(Self::High),
            other    => Err(format!("unknown task priority: {other}")),
        }
    }
}

/// A labelled external link attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLink {
    pub label: String,
    pub url: String,
}

/// A unit of work on a project board.
///
/// Invariant: `stage_id` always references a stage whose `project_id`
/// equals this task's `project_id`.  The board engine enforces it on every
/// path that re-stages a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTask {
    pub id: Uuid,
    pub project_id: Uuid,
    pub stage_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub position: i32,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub blocked_reason: Option<String>,
    pub visible_to_client: bool,
    #[serde(default)]
    pub links: Vec<TaskLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_their_wire_names() {
        for (ty, name) in [
            (ProjectType::Content, "content"),
            (ProjectType::LandingPage, "landing_page"),
            (ProjectType::Website, "website"),
        ] {
            assert_eq!(ty.to_string(), name);
            assert_eq!(name.parse::<ProjectType>().unwrap(), ty);
        }

        assert_eq!("archived".parse::<ProjectStatus>().unwrap(), ProjectStatus::Archived);
        assert!("paused".parse::<ProjectStatus>().is_err());
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn serde_names_match_display_names() {
        assert_eq!(
            serde_json::to_value(ProjectType::LandingPage).unwrap(),
            serde_json::Value::String("landing_page".into())
        );
        assert_eq!(
            serde_json::to_value(TaskPriority::Medium).unwrap(),
            serde_json::Value::String("medium".into())
        );
    }
}
