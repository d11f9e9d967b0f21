//! `store` crate — typed persistence layer.
//!
//! Row structs that mirror the persisted tables, plus the template and
//! project stores built on the `port` crate.  No business logic lives
//! here; the engine crate owns the domain semantics.

mod codec;
pub mod models;
pub mod projects;
pub mod templates;

pub use models::{
    ClientProject, ProjectStage, ProjectStatus, ProjectTask, ProjectType, TaskLink,
    TaskPriority, TemplateStage, TemplateTask, WorkflowTemplate,
};
pub use port::StoreError;
pub use projects::{ProjectPatch, ProjectStore, StagePosition, TaskPatch, TaskSlot};
pub use templates::{StagePatch, TemplateDetails, TemplatePatch, TemplateStore};
