//! Client project CRUD — projects, their stages, and board tasks.
//!
//! Stage order is load-bearing: the highest-position stage of a project is
//! its terminal ("done") stage, surfaced as the `is_terminal` flag.  Every
//! operation that creates or repositions stages re-derives the flag so the
//! progress metric cannot silently drift when a board is reordered.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use port::{Filter, Order, Row, RowStore, StoreError, Table};

use crate::codec::{from_row, to_row};
use crate::models::{ClientProject, ProjectStage, ProjectStatus, ProjectTask, ProjectType};

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Partial update for a project.  Unset fields are left unchanged; for the
/// nullable dates, `Some(None)` clears the column.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<NaiveDate>>,
}

/// Partial update for a board task.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<crate::models::TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_to_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<crate::models::TaskLink>>,
}

/// One entry of a bulk stage reorder.
#[derive(Debug, Clone, Copy)]
pub struct StagePosition {
    pub id: Uuid,
    pub position: i32,
}

/// One entry of a bulk task reorder; `stage_id` is set for the task that is
/// changing columns.
#[derive(Debug, Clone, Copy)]
pub struct TaskSlot {
    pub id: Uuid,
    pub stage_id: Option<Uuid>,
    pub position: i32,
}

// ---------------------------------------------------------------------------
// ProjectStore
// ---------------------------------------------------------------------------

/// Typed CRUD over the project tables.
#[derive(Clone)]
pub struct ProjectStore {
    port: Arc<dyn RowStore>,
}

impl ProjectStore {
    pub fn new(port: Arc<dyn RowStore>) -> Self {
        Self { port }
    }

    // ------ projects ------

    /// Insert a new project row in `active` status.
    pub async fn insert_project(
        &self,
        client_id: &str,
        name: &str,
        project_type: ProjectType,
        template_id: Option<Uuid>,
        start_date: Option<NaiveDate>,
        target_date: Option<NaiveDate>,
    ) -> Result<ClientProject, StoreError> {
        let mut fields = Row::new();
        fields.insert("client_id".into(), json!(client_id));
        fields.insert("template_id".into(), json!(template_id));
        fields.insert("name".into(), json!(name));
        fields.insert("project_type".into(), json!(project_type));
        fields.insert("status".into(), json!(ProjectStatus::Active));
        fields.insert("start_date".into(), json!(start_date));
        fields.insert("target_date".into(), json!(target_date));

        let row = self.port.insert(Table::ClientProjects, fields).await?;
        from_row(row)
    }

    /// All projects of a client, newest-created first.
    pub async fn client_projects(&self, client_id: &str) -> Result<Vec<ClientProject>, StoreError> {
        self.port
            .select_where(
                Table::ClientProjects,
                Some(Filter::eq("client_id", json!(client_id))),
                Some(Order::desc("created_at")),
            )
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Fetch a single project by its primary key.
    pub async fn project(&self, id: Uuid) -> Result<ClientProject, StoreError> {
        let rows = self
            .port
            .select_where(Table::ClientProjects, Some(Filter::key("id", id)), None)
            .await?;
        rows.into_iter().next().map(from_row).ok_or(StoreError::NotFound)?
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<ClientProject, StoreError> {
        let row = self
            .port
            .update(Table::ClientProjects, id, to_row(&patch)?)
            .await?;
        from_row(row)
    }

    /// Delete a project and everything under it: tasks, stages, then the
    /// project row itself.
    pub async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        let tasks = self.project_tasks(id).await?;
        for task in &tasks {
            self.port.delete(Table::ProjectTasks, task.id).await?;
        }
        let stages = self.project_stages(id).await?;
        for stage in &stages {
            self.port.delete(Table::ProjectStages, stage.id).await?;
        }
        self.port.delete(Table::ClientProjects, id).await?;
        info!(project_id = %id, stages = stages.len(), tasks = tasks.len(), "deleted project");
        Ok(())
    }

    // ------ stages ------

    /// Stages of a project, ascending by position.
    pub async fn project_stages(&self, project_id: Uuid) -> Result<Vec<ProjectStage>, StoreError> {
        self.port
            .select_where(
                Table::ProjectStages,
                Some(Filter::key("project_id", project_id)),
                Some(Order::asc("position")),
            )
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Fetch a single stage by its primary key.
    pub async fn stage(&self, id: Uuid) -> Result<ProjectStage, StoreError> {
        let rows = self
            .port
            .select_where(Table::ProjectStages, Some(Filter::key("id", id)), None)
            .await?;
        rows.into_iter().next().map(from_row).ok_or(StoreError::NotFound)?
    }

    /// Plain stage row insert with an explicit terminal flag.  Used by the
    /// instantiation engine, which knows the final stage set up front.
    pub async fn insert_stage(
        &self,
        project_id: Uuid,
        name: &str,
        position: i32,
        is_terminal: bool,
    ) -> Result<ProjectStage, StoreError> {
        let mut fields = Row::new();
        fields.insert("project_id".into(), json!(project_id));
        fields.insert("name".into(), json!(name));
        fields.insert("position".into(), json!(position));
        fields.insert("is_terminal".into(), json!(is_terminal));

        let row = self.port.insert(Table::ProjectStages, fields).await?;
        from_row(row)
    }

    /// Create a stage under an existing project and re-derive which stage
    /// of the project is terminal.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the project does not exist.
    pub async fn create_stage(
        &self,
        project_id: Uuid,
        name: &str,
        position: i32,
    ) -> Result<ProjectStage, StoreError> {
        self.project(project_id).await?;

        let stage = self.insert_stage(project_id, name, position, false).await?;
        self.refresh_terminal_flag(project_id).await?;
        self.stage(stage.id).await
    }

    /// Apply a bulk stage reorder as one batched write, then re-derive the
    /// terminal flag.
    ///
    /// Atomicity is exactly whatever the backend's `update_many` provides;
    /// on a sequential backend a mid-list failure leaves a partial reorder
    /// in place.
    pub async fn update_stage_positions(
        &self,
        positions: &[StagePosition],
    ) -> Result<(), StoreError> {
        let Some(first) = positions.first() else {
            return Ok(());
        };

        let patches = positions
            .iter()
            .map(|entry| {
                let mut fields = Row::new();
                fields.insert("position".into(), json!(entry.position));
                (entry.id, fields)
            })
            .collect();
        self.port.update_many(Table::ProjectStages, patches).await?;

        let project_id = self.stage(first.id).await?.project_id;
        self.refresh_terminal_flag(project_id).await
    }

    /// Point `is_terminal` at the highest-position stage of the project.
    async fn refresh_terminal_flag(&self, project_id: Uuid) -> Result<(), StoreError> {
        let stages = self.project_stages(project_id).await?;
        let Some(last) = stages.last() else {
            return Ok(());
        };

        let patches: Vec<(Uuid, Row)> = stages
            .iter()
            .filter(|stage| stage.is_terminal != (stage.id == last.id))
            .map(|stage| {
                let mut fields = Row::new();
                fields.insert("is_terminal".into(), json!(stage.id == last.id));
                (stage.id, fields)
            })
            .collect();

        if patches.is_empty() {
            return Ok(());
        }
        self.port.update_many(Table::ProjectStages, patches).await
    }

    // ------ tasks ------

    /// Tasks of a project, ascending by position.
    pub async fn project_tasks(&self, project_id: Uuid) -> Result<Vec<ProjectTask>, StoreError> {
        self.port
            .select_where(
                Table::ProjectTasks,
                Some(Filter::key("project_id", project_id)),
                Some(Order::asc("position")),
            )
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Tasks of a single stage, ascending by position.
    pub async fn stage_tasks(&self, stage_id: Uuid) -> Result<Vec<ProjectTask>, StoreError> {
        self.port
            .select_where(
                Table::ProjectTasks,
                Some(Filter::key("stage_id", stage_id)),
                Some(Order::asc("position")),
            )
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Fetch a single task by its primary key.
    pub async fn task(&self, id: Uuid) -> Result<ProjectTask, StoreError> {
        let rows = self
            .port
            .select_where(Table::ProjectTasks, Some(Filter::key("id", id)), None)
            .await?;
        rows.into_iter().next().map(from_row).ok_or(StoreError::NotFound)?
    }

    /// Insert a task row with store-level defaults: medium priority,
    /// unblocked, no due date, no description, no links.
    pub async fn insert_task(
        &self,
        project_id: Uuid,
        stage_id: Uuid,
        title: &str,
        position: i32,
        visible_to_client: bool,
    ) -> Result<ProjectTask, StoreError> {
        let mut fields = Row::new();
        fields.insert("project_id".into(), json!(project_id));
        fields.insert("stage_id".into(), json!(stage_id));
        fields.insert("title".into(), json!(title));
        fields.insert("description".into(), json!(null));
        fields.insert("position".into(), json!(position));
        fields.insert("due_date".into(), json!(null));
        fields.insert("priority".into(), json!(crate::models::TaskPriority::Medium));
        fields.insert("is_blocked".into(), json!(false));
        fields.insert("blocked_reason".into(), json!(null));
        fields.insert("visible_to_client".into(), json!(visible_to_client));
        fields.insert("links".into(), json!([]));

        let row = self.port.insert(Table::ProjectTasks, fields).await?;
        from_row(row)
    }

    pub async fn patch_task(&self, id: Uuid, patch: &TaskPatch) -> Result<ProjectTask, StoreError> {
        let row = self.port.update(Table::ProjectTasks, id, to_row(patch)?).await?;
        from_row(row)
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        self.port.delete(Table::ProjectTasks, id).await
    }

    /// Apply a bulk task reorder (optionally re-staging one task) as a
    /// single batched write.
    pub async fn reposition_tasks(&self, slots: &[TaskSlot]) -> Result<(), StoreError> {
        if slots.is_empty() {
            return Ok(());
        }

        let patches = slots
            .iter()
            .map(|slot| {
                let mut fields = Row::new();
                fields.insert("position".into(), json!(slot.position));
                if let Some(stage_id) = slot.stage_id {
                    fields.insert("stage_id".into(), json!(stage_id));
                }
                (slot.id, fields)
            })
            .collect();
        self.port.update_many(Table::ProjectTasks, patches).await
    }
}
