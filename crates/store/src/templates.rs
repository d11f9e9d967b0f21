//! Workflow template CRUD — templates, their stages, and stage tasks.
//!
//! The row port has no foreign-key cascades, so parent checks and cascade
//! deletes are performed here, one awaited call per row.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use port::{Filter, Order, Row, RowStore, StoreError, Table};

use crate::codec::{from_row, to_row};
use crate::models::{TemplateStage, TemplateTask, WorkflowTemplate};

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Partial update for a template.  Unset fields are left unchanged; for
/// `description`, `Some(None)` clears the column.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

/// Partial update for a template stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

// ---------------------------------------------------------------------------
// TemplateDetails
// ---------------------------------------------------------------------------

/// A template with its full stage/task graph.
///
/// `stages` is ascending by position; `tasks` is the union over the
/// template's stages (so task rows pointing at a stage outside this
/// template never appear), each stage's tasks ascending by position.
#[derive(Debug, Clone)]
pub struct TemplateDetails {
    pub template: WorkflowTemplate,
    pub stages: Vec<TemplateStage>,
    pub tasks: Vec<TemplateTask>,
}

// ---------------------------------------------------------------------------
// TemplateStore
// ---------------------------------------------------------------------------

/// Typed CRUD over the template tables.
#[derive(Clone)]
pub struct TemplateStore {
    port: Arc<dyn RowStore>,
}

impl TemplateStore {
    pub fn new(port: Arc<dyn RowStore>) -> Self {
        Self { port }
    }

    // ------ templates ------

    pub async fn create_template(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<WorkflowTemplate, StoreError> {
        let mut fields = Row::new();
        fields.insert("name".into(), json!(name));
        fields.insert("description".into(), json!(description));

        let row = self.port.insert(Table::WorkflowTemplates, fields).await?;
        from_row(row)
    }

    /// Fetch a single template by its primary key.
    pub async fn template(&self, id: Uuid) -> Result<WorkflowTemplate, StoreError> {
        let rows = self
            .port
            .select_where(Table::WorkflowTemplates, Some(Filter::key("id", id)), None)
            .await?;
        rows.into_iter().next().map(from_row).ok_or(StoreError::NotFound)?
    }

    pub async fn update_template(
        &self,
        id: Uuid,
        patch: TemplatePatch,
    ) -> Result<WorkflowTemplate, StoreError> {
        let row = self
            .port
            .update(Table::WorkflowTemplates, id, to_row(&patch)?)
            .await?;
        from_row(row)
    }

    /// Delete a template and everything under it: each stage's tasks, the
    /// stages, then the template row itself.
    pub async fn delete_template(&self, id: Uuid) -> Result<(), StoreError> {
        let stages = self.stages(id).await?;
        for stage in &stages {
            for task in self.stage_tasks(stage.id).await? {
                self.port.delete(Table::TemplateTasks, task.id).await?;
            }
            self.port.delete(Table::TemplateStages, stage.id).await?;
        }
        self.port.delete(Table::WorkflowTemplates, id).await?;
        info!(template_id = %id, stages = stages.len(), "deleted template");
        Ok(())
    }

    /// Load the full template graph in one call.
    pub async fn get_template_with_details(&self, id: Uuid) -> Result<TemplateDetails, StoreError> {
        let template = self.template(id).await?;
        let stages = self.stages(id).await?;

        let mut tasks = Vec::new();
        for stage in &stages {
            tasks.extend(self.stage_tasks(stage.id).await?);
        }

        Ok(TemplateDetails { template, stages, tasks })
    }

    // ------ stages ------

    /// Stages of a template, ascending by position.
    pub async fn stages(&self, template_id: Uuid) -> Result<Vec<TemplateStage>, StoreError> {
        self.port
            .select_where(
                Table::TemplateStages,
                Some(Filter::key("template_id", template_id)),
                Some(Order::asc("position")),
            )
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Create a stage under an existing template.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the template does not exist.
    pub async fn create_stage(
        &self,
        template_id: Uuid,
        name: &str,
        position: i32,
    ) -> Result<TemplateStage, StoreError> {
        self.template(template_id).await?;

        let mut fields = Row::new();
        fields.insert("template_id".into(), json!(template_id));
        fields.insert("name".into(), json!(name));
        fields.insert("position".into(), json!(position));

        let row = self.port.insert(Table::TemplateStages, fields).await?;
        from_row(row)
    }

    pub async fn update_stage(
        &self,
        id: Uuid,
        patch: StagePatch,
    ) -> Result<TemplateStage, StoreError> {
        let row = self
            .port
            .update(Table::TemplateStages, id, to_row(&patch)?)
            .await?;
        from_row(row)
    }

    /// Delete a stage and its tasks.
    pub async fn delete_stage(&self, id: Uuid) -> Result<(), StoreError> {
        for task in self.stage_tasks(id).await? {
            self.port.delete(Table::TemplateTasks, task.id).await?;
        }
        self.port.delete(Table::TemplateStages, id).await
    }

    // ------ tasks ------

    /// Tasks of a stage, ascending by position.
    pub async fn stage_tasks(&self, stage_id: Uuid) -> Result<Vec<TemplateTask>, StoreError> {
        self.port
            .select_where(
                Table::TemplateTasks,
                Some(Filter::key("stage_id", stage_id)),
                Some(Order::asc("position")),
            )
            .await?
            .into_iter()
            .map(from_row)
            .collect()
    }

    /// Create a task under an existing stage.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the stage does not exist.
    pub async fn create_task(
        &self,
        stage_id: Uuid,
        title: &str,
        position: i32,
    ) -> Result<TemplateTask, StoreError> {
        let stage_rows = self
            .port
            .select_where(Table::TemplateStages, Some(Filter::key("id", stage_id)), None)
            .await?;
        if stage_rows.is_empty() {
            return Err(StoreError::NotFound);
        }

        let mut fields = Row::new();
        fields.insert("stage_id".into(), json!(stage_id));
        fields.insert("title".into(), json!(title));
        fields.insert("position".into(), json!(position));

        let row = self.port.insert(Table::TemplateTasks, fields).await?;
        from_row(row)
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        self.port.delete(Table::TemplateTasks, id).await
    }
}
