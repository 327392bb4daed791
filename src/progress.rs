//! Read-side progress rollups. Task progress is authoritative and is never
//! rewritten from these aggregates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::TaskId;
use crate::schedule::{ProjectSchedule, ScheduleResult};
use crate::task::{Task, TaskStatus};

/// Default weight of a milestone in the duration-weighted average.
pub const DEFAULT_MILESTONE_WEIGHT_DAYS: i64 = 1;

/// Duration-weighted completion percentage in `[0, 100]`.
///
/// Milestones count as 0 or 100 with `milestone_weight_days` as their weight.
/// When every weight is zero the plain mean is used; no tasks yields 0.
pub fn aggregate_progress<'a, I>(tasks: I, milestone_weight_days: i64) -> f64
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut plain_sum = 0.0;
    let mut count = 0usize;

    for task in tasks {
        let (weight, value) = if task.is_milestone {
            let value = if task.is_complete() { 100.0 } else { 0.0 };
            (milestone_weight_days.max(0) as f64, value)
        } else {
            (
                task.duration_days.max(0) as f64,
                task.progress_percentage.clamp(0.0, 100.0),
            )
        };
        weighted_sum += weight * value;
        total_weight += weight;
        plain_sum += value;
        count += 1;
    }

    if count == 0 {
        0.0
    } else if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        plain_sum / count as f64
    }
}

/// A task is overdue when its computed end has passed and it is not complete.
pub fn is_overdue(task: &Task, result: &ScheduleResult, today: NaiveDate) -> bool {
    !task.is_complete() && result.computed_end < today
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub weighted_percent: f64,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: Vec<TaskId>,
}

pub fn summarize_progress(
    tasks: &[Task],
    schedule: &ProjectSchedule,
    today: NaiveDate,
    milestone_weight_days: i64,
) -> ProgressSummary {
    let results = schedule.by_task();
    let mut summary = ProgressSummary {
        weighted_percent: aggregate_progress(tasks, milestone_weight_days),
        not_started: 0,
        in_progress: 0,
        completed: 0,
        overdue: Vec::new(),
    };

    for task in tasks {
        match task.status {
            TaskStatus::NotStarted => summary.not_started += 1,
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::Completed => summary.completed += 1,
        }
        if let Some(result) = results.get(&task.id) {
            if is_overdue(task, result, today) {
                summary.overdue.push(task.id);
            }
        }
    }
    summary.overdue.sort_unstable();
    summary
}
