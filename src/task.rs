use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{ProjectId, TaskId};

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not_started" | "notstarted" | "not started" => Ok(TaskStatus::NotStarted),
            "in_progress" | "inprogress" | "in progress" => Ok(TaskStatus::InProgress),
            "completed" | "complete" | "done" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// Manual date pin. A pinned task ignores the dates its incoming edges imply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl SchedulePin {
    pub fn start(date: NaiveDate) -> Self {
        Self {
            start: Some(date),
            end: None,
        }
    }

    pub fn end(date: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(date),
        }
    }

    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub name: String,
    pub duration_days: i64,
    #[serde(default)]
    pub pin: SchedulePin,
    /// Start used when the task has no incoming dependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned_start: Option<NaiveDate>,
    #[serde(default)]
    pub progress_percentage: f64,
    #[serde(default)]
    pub is_milestone: bool,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub task_order: i64,
}

impl Task {
    pub fn new(id: TaskId, project_id: ProjectId, name: impl Into<String>, duration_days: i64) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
            duration_days,
            pin: SchedulePin::default(),
            planned_start: None,
            progress_percentage: 0.0,
            is_milestone: false,
            status: TaskStatus::NotStarted,
            task_order: id,
        }
    }

    pub fn milestone(id: TaskId, project_id: ProjectId, name: impl Into<String>) -> Self {
        let mut task = Self::new(id, project_id, name, 0);
        task.is_milestone = true;
        task
    }

    /// Duration used for date arithmetic; milestones always span zero days.
    pub fn effective_duration(&self) -> i64 {
        if self.is_milestone { 0 } else { self.duration_days }
    }

    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Completed || self.progress_percentage >= 100.0 - EPSILON
    }

    /// Sort key for deterministic ordering among otherwise equal tasks.
    pub fn order_key(&self) -> (i64, TaskId) {
        (self.task_order, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskValidationError {
    pub task_id: TaskId,
    message: String,
}

impl TaskValidationError {
    pub fn new(task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            task_id,
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskValidationError {}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.duration_days < 0 {
        return Err(TaskValidationError::new(
            task.id,
            format!("task {} has negative duration {}", task.id, task.duration_days),
        ));
    }

    let pct = task.progress_percentage;
    if !pct.is_finite() || pct < -EPSILON || pct > 100.0 + EPSILON {
        return Err(TaskValidationError::new(
            task.id,
            format!(
                "task {} has invalid progress_percentage {} (must be between 0 and 100)",
                task.id, pct
            ),
        ));
    }

    Ok(())
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen_ids.insert(task.id) {
            return Err(TaskValidationError::new(
                task.id,
                format!("duplicate task id {}", task.id),
            ));
        }
        validate_task(task)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_has_zero_effective_duration() {
        let mut task = Task::milestone(1, 1, "Handover");
        task.duration_days = 4;
        assert_eq!(task.effective_duration(), 0);
    }

    #[test]
    fn rejects_progress_outside_range() {
        let mut task = Task::new(3, 1, "Pour slab", 2);
        task.progress_percentage = 120.0;
        let err = validate_task(&task).unwrap_err();
        assert_eq!(err.task_id, 3);
        assert!(err.to_string().contains("progress_percentage"));

        task.progress_percentage = f64::NAN;
        assert!(validate_task(&task).is_err());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let tasks = vec![Task::new(1, 1, "A", 1), Task::new(1, 1, "B", 1)];
        let err = validate_task_collection(&tasks).unwrap_err();
        assert!(err.to_string().contains("duplicate task id 1"));
    }

    #[test]
    fn completed_status_counts_as_complete() {
        let mut task = Task::new(1, 1, "Frame", 3);
        assert!(!task.is_complete());
        task.status = TaskStatus::Completed;
        assert!(task.is_complete());
    }
}
