//! Project instantiation — the deep copy from a template graph to a fresh,
//! independent project graph.
//!
//! The clone is sequential: the project row first, then stages in position
//! order (each stage id must be known before its tasks can be cloned),
//! then tasks.  There is no transaction boundary across the steps; a
//! failure part-way through surfaces as
//! [`EngineError::PartialInstantiation`] and leaves the rows written so
//! far in place.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use port::{RowStore, StoreError};
use store::{ClientProject, ProjectStore, ProjectType, TemplateStore};

use crate::EngineError;

/// Stage skeleton used when a project is created without a template.
const DEFAULT_STAGES: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Everything needed to start a project for a client.
#[derive(Debug, Clone)]
pub struct NewProject {
    /// Reference to an external client entity; opaque to the engine.
    pub client_id: String,
    pub name: String,
    pub project_type: ProjectType,
    /// Template to clone from; provenance only once the clone is done.
    pub template_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
}

/// Rows written after the project row itself, for partial-failure
/// reporting.
#[derive(Default)]
struct Created {
    stages: usize,
    tasks: usize,
}

/// Materializes new project graphs.  Stateless between calls.
pub struct Instantiator {
    templates: TemplateStore,
    projects: ProjectStore,
}

impl Instantiator {
    pub fn new(port: Arc<dyn RowStore>) -> Self {
        Self {
            templates: TemplateStore::new(port.clone()),
            projects: ProjectStore::new(port),
        }
    }

    /// Create a project and materialize its stage/task graph.
    ///
    /// With a template: clone the template's stages and tasks, preserving
    /// names, titles and positions verbatim; every other task field takes
    /// its store default.  Without one: seed the default three-stage
    /// skeleton and no tasks.
    ///
    /// # Errors
    /// A failure before the project row exists is a plain
    /// [`EngineError::Store`]; any later failure is
    /// [`EngineError::PartialInstantiation`].
    #[instrument(skip(self, spec), fields(client_id = %spec.client_id, name = %spec.name))]
    pub async fn create_project(&self, spec: NewProject) -> Result<ClientProject, EngineError> {
        let project = self
            .projects
            .insert_project(
                &spec.client_id,
                &spec.name,
                spec.project_type,
                spec.template_id,
                spec.start_date,
                spec.target_date,
            )
            .await?;

        let mut created = Created::default();
        let seeded = match spec.template_id {
            Some(template_id) => {
                self.clone_template(project.id, template_id, &mut created).await
            }
            None => self.seed_default_stages(project.id, &mut created).await,
        };

        match seeded {
            Ok(()) => {
                info!(
                    project_id = %project.id,
                    stages = created.stages,
                    tasks = created.tasks,
                    "project instantiated"
                );
                Ok(project)
            }
            Err(source) => Err(EngineError::PartialInstantiation {
                project_id: project.id,
                stages_created: created.stages,
                tasks_created: created.tasks,
                source,
            }),
        }
    }

    /// Deep-copy the template graph under `project_id`.
    ///
    /// The clone shares no mutable identity with the template: every row
    /// gets a fresh id, and later edits to either side are independent.
    async fn clone_template(
        &self,
        project_id: Uuid,
        template_id: Uuid,
        created: &mut Created,
    ) -> Result<(), StoreError> {
        let details = self.templates.get_template_with_details(template_id).await?;
        let last_position = details.stages.iter().map(|s| s.position).max();

        // Template-stage id → cloned project-stage id.
        let mut stage_map: HashMap<Uuid, Uuid> = HashMap::with_capacity(details.stages.len());
        for stage in &details.stages {
            let cloned = self
                .projects
                .insert_stage(
                    project_id,
                    &stage.name,
                    stage.position,
                    Some(stage.position) == last_position,
                )
                .await?;
            created.stages += 1;
            stage_map.insert(stage.id, cloned.id);
        }

        for task in &details.tasks {
            let Some(&stage_id) = stage_map.get(&task.stage_id) else {
                // A consistent template cannot get here; skip rather than
                // abort the whole clone over a stray row.
                warn!(task_id = %task.id, "task references a stage outside its template, skipping");
                continue;
            };
            self.projects
                .insert_task(project_id, stage_id, &task.title, task.position, true)
                .await?;
            created.tasks += 1;
        }

        Ok(())
    }

    async fn seed_default_stages(
        &self,
        project_id: Uuid,
        created: &mut Created,
    ) -> Result<(), StoreError> {
        for (position, name) in DEFAULT_STAGES.into_iter().enumerate() {
            self.projects
                .insert_stage(
                    project_id,
                    name,
                    position as i32,
                    position == DEFAULT_STAGES.len() - 1,
                )
                .await?;
            created.stages += 1;
        }
        Ok(())
    }
}
