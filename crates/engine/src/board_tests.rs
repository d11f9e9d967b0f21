//! Tests for the board engine: moves, re-packing, guards, and the metrics
//! they feed.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use port::MemoryStore;
use store::{ClientProject, ProjectStage, ProjectStore, ProjectType, TaskPatch};

use crate::{blocked_count, project_progress, Board, EngineError, Instantiator, NewProject};

struct Fixture {
    board: Board,
    projects: ProjectStore,
    engine: Instantiator,
}

fn fixture() -> Fixture {
    let port: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    Fixture {
        board: Board::new(port.clone()),
        projects: ProjectStore::new(port.clone()),
        engine: Instantiator::new(port),
    }
}

impl Fixture {
    /// A blank project with the default To Do / In Progress / Done board.
    async fn blank_project(&self, name: &str) -> ClientProject {
        self.engine
            .create_project(NewProject {
                client_id: "client-42".into(),
                name: name.into(),
                project_type: ProjectType::Website,
                template_id: None,
                start_date: None,
                target_date: None,
            })
            .await
            .expect("instantiate")
    }

    async fn stage_named(&self, project_id: Uuid, name: &str) -> ProjectStage {
        self.projects
            .project_stages(project_id)
            .await
            .expect("stages")
            .into_iter()
            .find(|s| s.name == name)
            .expect("stage by name")
    }
}

#[tokio::test]
async fn moving_every_task_into_the_terminal_stage_completes_the_project() {
    let fx = fixture();
    let project = fx.blank_project("Acme Site").await;
    let todo = fx.stage_named(project.id, "To Do").await;
    let done = fx.stage_named(project.id, "Done").await;

    for (i, title) in ["Wireframes", "Mockups", "Frontend"].into_iter().enumerate() {
        fx.board
            .create_task(project.id, todo.id, title, i as i32, true)
            .await
            .expect("create task");
    }

    let tasks = fx.projects.project_tasks(project.id).await.expect("tasks");
    let stages = fx.projects.project_stages(project.id).await.expect("stages");
    assert_eq!(project_progress(&tasks, &stages), 0);

    for task in &tasks {
        fx.board.move_task(task.id, done.id, 0).await.expect("move");
    }

    let tasks = fx.projects.project_tasks(project.id).await.expect("tasks");
    assert_eq!(project_progress(&tasks, &stages), 100);
}

#[tokio::test]
async fn cross_project_moves_fail_and_leave_the_task_in_place() {
    let fx = fixture();
    let ours = fx.blank_project("Acme Site").await;
    let theirs = fx.blank_project("Globex Site").await;

    let our_todo = fx.stage_named(ours.id, "To Do").await;
    let their_done = fx.stage_named(theirs.id, "Done").await;

    let task = fx
        .board
        .create_task(ours.id, our_todo.id, "Wireframes", 0, true)
        .await
        .expect("create task");

    let result = fx.board.move_task(task.id, their_done.id, 0).await;
    assert!(matches!(
        result,
        Err(EngineError::CrossProjectMove { stage_project, task_project, .. })
            if stage_project == theirs.id && task_project == ours.id
    ));

    let untouched = fx.projects.task(task.id).await.expect("task");
    assert_eq!(untouched.stage_id, our_todo.id);
    assert_eq!(untouched.position, 0);
}

#[tokio::test]
async fn restaging_through_a_patch_hits_the_same_guard() {
    let fx = fixture();
    let ours = fx.blank_project("Acme Site").await;
    let theirs = fx.blank_project("Globex Site").await;

    let our_todo = fx.stage_named(ours.id, "To Do").await;
    let their_todo = fx.stage_named(theirs.id, "To Do").await;

    let task = fx
        .board
        .create_task(ours.id, our_todo.id, "Wireframes", 0, true)
        .await
        .expect("create task");

    let result = fx
        .board
        .update_task(
            task.id,
            TaskPatch { stage_id: Some(their_todo.id), ..Default::default() },
        )
        .await;
    assert!(matches!(result, Err(EngineError::CrossProjectMove { .. })));
}

#[tokio::test]
async fn create_task_rejects_a_stage_of_another_project() {
    let fx = fixture();
    let ours = fx.blank_project("Acme Site").await;
    let theirs = fx.blank_project("Globex Site").await;
    let their_todo = fx.stage_named(theirs.id, "To Do").await;

    let result = fx
        .board
        .create_task(ours.id, their_todo.id, "Wireframes", 0, true)
        .await;
    assert!(matches!(result, Err(EngineError::CrossProjectMove { .. })));
}

#[tokio::test]
async fn moving_between_stages_repacks_both_columns_dense() {
    let fx = fixture();
    let project = fx.blank_project("Acme Site").await;
    let todo = fx.stage_named(project.id, "To Do").await;
    let doing = fx.stage_named(project.id, "In Progress").await;

    let mut ids = Vec::new();
    for (i, title) in ["a", "b", "c"].into_iter().enumerate() {
        let task = fx
            .board
            .create_task(project.id, todo.id, title, i as i32, true)
            .await
            .expect("create task");
        ids.push(task.id);
    }

    // Pull the middle task out of the column.
    let moved = fx.board.move_task(ids[1], doing.id, 0).await.expect("move");
    assert_eq!(moved.stage_id, doing.id);
    assert_eq!(moved.position, 0);

    let remaining = fx.projects.stage_tasks(todo.id).await.expect("tasks");
    let order: Vec<(&str, i32)> = remaining
        .iter()
        .map(|t| (t.title.as_str(), t.position))
        .collect();
    assert_eq!(order, vec![("a", 0), ("c", 1)]);
}

#[tokio::test]
async fn same_stage_moves_reorder_the_column() {
    let fx = fixture();
    let project = fx.blank_project("Acme Site").await;
    let todo = fx.stage_named(project.id, "To Do").await;

    let mut ids = Vec::new();
    for (i, title) in ["a", "b", "c"].into_iter().enumerate() {
        let task = fx
            .board
            .create_task(project.id, todo.id, title, i as i32, true)
            .await
            .expect("create task");
        ids.push(task.id);
    }

    fx.board.move_task(ids[2], todo.id, 0).await.expect("move");

    let column = fx.projects.stage_tasks(todo.id).await.expect("tasks");
    let order: Vec<(&str, i32)> = column
        .iter()
        .map(|t| (t.title.as_str(), t.position))
        .collect();
    assert_eq!(order, vec![("c", 0), ("a", 1), ("b", 2)]);
}

#[tokio::test]
async fn requested_positions_are_clamped_into_the_column() {
    let fx = fixture();
    let project = fx.blank_project("Acme Site").await;
    let todo = fx.stage_named(project.id, "To Do").await;
    let doing = fx.stage_named(project.id, "In Progress").await;

    let anchor = fx
        .board
        .create_task(project.id, doing.id, "anchor", 0, true)
        .await
        .expect("create task");
    let task = fx
        .board
        .create_task(project.id, todo.id, "wandering", 0, true)
        .await
        .expect("create task");

    let moved = fx.board.move_task(task.id, doing.id, 99).await.expect("move");
    assert_eq!(moved.position, 1);
    assert_eq!(fx.projects.task(anchor.id).await.expect("task").position, 0);

    let back = fx.board.move_task(task.id, todo.id, -7).await.expect("move");
    assert_eq!(back.position, 0);
}

#[tokio::test]
async fn task_patches_edit_fields_in_place() {
    let fx = fixture();
    let project = fx.blank_project("Acme Site").await;
    let todo = fx.stage_named(project.id, "To Do").await;

    let task = fx
        .board
        .create_task(project.id, todo.id, "Wireframes", 0, true)
        .await
        .expect("create task");

    let due = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
    let updated = fx
        .board
        .update_task(
            task.id,
            TaskPatch {
                is_blocked: Some(true),
                blocked_reason: Some(Some("waiting on client copy".into())),
                due_date: Some(Some(due)),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    assert!(updated.is_blocked);
    assert_eq!(updated.blocked_reason.as_deref(), Some("waiting on client copy"));
    assert_eq!(updated.due_date, Some(due));
    // Untouched fields survive the patch.
    assert_eq!(updated.title, "Wireframes");

    let tasks = fx.projects.project_tasks(project.id).await.expect("tasks");
    assert_eq!(blocked_count(&tasks), 1);

    let unblocked = fx
        .board
        .update_task(
            task.id,
            TaskPatch {
                is_blocked: Some(false),
                blocked_reason: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert!(!unblocked.is_blocked);
    assert_eq!(unblocked.blocked_reason, None);
}

#[tokio::test]
async fn deleted_tasks_are_gone() {
    let fx = fixture();
    let project = fx.blank_project("Acme Site").await;
    let todo = fx.stage_named(project.id, "To Do").await;

    let task = fx
        .board
        .create_task(project.id, todo.id, "Wireframes", 0, true)
        .await
        .expect("create task");

    fx.board.delete_task(task.id).await.expect("delete");
    assert!(fx.projects.task(task.id).await.is_err());
    assert!(fx.board.delete_task(task.id).await.is_err());
}
