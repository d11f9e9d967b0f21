//! Engine-level error types.

use port::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the instantiation and board engines.
///
/// The engine fails fast: the first store failure is surfaced to the
/// caller and prior successful writes are left in place — there is no
/// compensating rollback.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A task was pointed at a stage of a different project.
    #[error("stage {stage_id} belongs to project {stage_project}, not project {task_project}")]
    CrossProjectMove {
        stage_id: Uuid,
        task_project: Uuid,
        stage_project: Uuid,
    },

    /// The multi-step clone aborted after the project row was created,
    /// leaving a partially populated project behind.  Manual deletion and
    /// a retry of the whole operation is the only recovery.
    #[error(
        "project {project_id} left partially instantiated \
         ({stages_created} stages, {tasks_created} tasks): {source}"
    )]
    PartialInstantiation {
        project_id: Uuid,
        stages_created: usize,
        tasks_created: usize,
        #[source]
        source: StoreError,
    },

    /// Persistence error from the store layer.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
