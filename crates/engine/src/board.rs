//! Board engine — task creation, movement between stages, and field edits.
//!
//! Stage membership is the only state dimension a task has; there is no
//! state machine beyond "a task belongs to exactly one stage at a time".
//! Every path that points a task at a stage checks that the stage belongs
//! to the task's project — a cross-project move must fail, never silently
//! succeed.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use port::RowStore;
use store::{ProjectStage, ProjectStore, ProjectTask, TaskPatch, TaskSlot};

use crate::EngineError;

/// Task movement and mutation over one injected row store.
pub struct Board {
    projects: ProjectStore,
}

impl Board {
    pub fn new(port: Arc<dyn RowStore>) -> Self {
        Self { projects: ProjectStore::new(port) }
    }

    /// Create a task in the given stage.
    ///
    /// # Errors
    /// [`EngineError::CrossProjectMove`] if the stage belongs to a
    /// different project.
    pub async fn create_task(
        &self,
        project_id: Uuid,
        stage_id: Uuid,
        title: &str,
        position: i32,
        visible_to_client: bool,
    ) -> Result<ProjectTask, EngineError> {
        let stage = self.projects.stage(stage_id).await?;
        check_same_project(project_id, &stage)?;

        Ok(self
            .projects
            .insert_task(project_id, stage_id, title, position, visible_to_client)
            .await?)
    }

    /// Move a task to `new_stage_id` at `new_position`, re-packing sibling
    /// positions dense (0..n) in both the vacated and the receiving stage.
    ///
    /// The requested position is clamped into the receiving stage's range.
    /// Both stages' renumberings land in one batched write, so on an
    /// atomic backend a move is all-or-nothing.
    pub async fn move_task(
        &self,
        task_id: Uuid,
        new_stage_id: Uuid,
        new_position: i32,
    ) -> Result<ProjectTask, EngineError> {
        let task = self.projects.task(task_id).await?;
        let stage = self.projects.stage(new_stage_id).await?;
        check_same_project(task.project_id, &stage)?;

        let mut slots: Vec<TaskSlot> = Vec::new();

        // Receiving stage: splice the task in at the clamped index, then
        // renumber whatever shifted.
        let mut incoming: Vec<ProjectTask> = self
            .projects
            .stage_tasks(new_stage_id)
            .await?
            .into_iter()
            .filter(|t| t.id != task.id)
            .collect();
        let index = (new_position.max(0) as usize).min(incoming.len());
        incoming.insert(index, task.clone());

        for (i, sibling) in incoming.iter().enumerate() {
            let position = i as i32;
            if sibling.id == task.id {
                slots.push(TaskSlot { id: task.id, stage_id: Some(new_stage_id), position });
            } else if sibling.position != position {
                slots.push(TaskSlot { id: sibling.id, stage_id: None, position });
            }
        }

        // Vacated stage closes its gap.
        if task.stage_id != new_stage_id {
            let remaining = self.projects.stage_tasks(task.stage_id).await?;
            for (i, sibling) in remaining.iter().filter(|t| t.id != task.id).enumerate() {
                let position = i as i32;
                if sibling.position != position {
                    slots.push(TaskSlot { id: sibling.id, stage_id: None, position });
                }
            }
        }

        self.projects.reposition_tasks(&slots).await?;
        info!(task_id = %task_id, stage_id = %new_stage_id, position = index, "task moved");
        Ok(self.projects.task(task_id).await?)
    }

    /// Patch arbitrary task fields.  No field is special-cased except
    /// `updated_at`, which the backend refreshes on every write; a patch
    /// that re-stages the task goes through the cross-project check.
    pub async fn update_task(
        &self,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<ProjectTask, EngineError> {
        if let Some(stage_id) = patch.stage_id {
            let task = self.projects.task(task_id).await?;
            let stage = self.projects.stage(stage_id).await?;
            check_same_project(task.project_id, &stage)?;
        }

        Ok(self.projects.patch_task(task_id, &patch).await?)
    }

    pub async fn delete_task(&self, task_id: Uuid) -> Result<(), EngineError> {
        Ok(self.projects.delete_task(task_id).await?)
    }
}

fn check_same_project(project_id: Uuid, stage: &ProjectStage) -> Result<(), EngineError> {
    if stage.project_id != project_id {
        return Err(EngineError::CrossProjectMove {
            stage_id: stage.id,
            task_project: project_id,
            stage_project: stage.project_id,
        });
    }
    Ok(())
}
