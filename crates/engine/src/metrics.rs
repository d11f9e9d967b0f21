//! Derived board metrics — pure functions over already-loaded rows.
//!
//! No failure modes here; errors belong to the store layer that supplies
//! the collections.

use chrono::{NaiveDate, Utc};

use store::{ProjectStage, ProjectTask};

/// Completion percentage: the share of tasks sitting in the project's
/// terminal stage, rounded to the nearest integer.
///
/// `stages` must be the project's stages sorted ascending by position.
/// The done stage is the one flagged `is_terminal`; if no stage carries
/// the flag, the last of the slice stands in.  Returns 0 when there are
/// no tasks or no stages.
pub fn project_progress(tasks: &[ProjectTask], stages: &[ProjectStage]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let Some(done) = stages.iter().find(|s| s.is_terminal).or_else(|| stages.last()) else {
        return 0;
    };

    let in_done = tasks.iter().filter(|t| t.stage_id == done.id).count();
    (100.0 * in_done as f64 / tasks.len() as f64).round() as u8
}

/// Count of tasks whose due date is strictly before `today`.
///
/// A task due today is not overdue; a task with no due date never is.
pub fn overdue_count(tasks: &[ProjectTask], today: NaiveDate) -> usize {
    tasks
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| due < today))
        .count()
}

/// [`overdue_count`] against the current UTC date.
pub fn overdue_count_today(tasks: &[ProjectTask]) -> usize {
    overdue_count(tasks, Utc::now().date_naive())
}

/// Count of blocked tasks, independent of stage membership and due dates.
pub fn blocked_count(tasks: &[ProjectTask]) -> usize {
    tasks.iter().filter(|t| t.is_blocked).count()
}
