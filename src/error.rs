//! Structured error taxonomy for graph building, validation and scheduling.
//!
//! Every variant carries the ids a caller needs to render an actionable
//! message; none of them is a bare string.

use thiserror::Error;

use crate::dependency::DependencyType;
use crate::persistence::StoreError;
use crate::task::TaskValidationError;
use crate::{DependencyId, ProjectId, TaskId};

/// Record kind named in [`ScheduleError::ProjectMismatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Task,
    Dependency,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Task => write!(f, "task"),
            RecordKind::Dependency => write!(f, "dependency"),
        }
    }
}

/// Why a task's dates could not be derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    EndBeforeStart {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
    LeadNotAllowed(i64),
    DateOutOfRange,
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintViolation::EndBeforeStart { start, end } => {
                write!(f, "end {end} is earlier than start {start}")
            }
            ConstraintViolation::LeadNotAllowed(lag) => {
                write!(f, "lag {lag} is a lead and leads are disabled")
            }
            ConstraintViolation::DateOutOfRange => write!(f, "date is out of range"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(
        "dependency {dependency_id} in project {project_id} references missing task {task_id}"
    )]
    MissingReference {
        project_id: ProjectId,
        dependency_id: DependencyId,
        task_id: TaskId,
    },

    #[error("{kind} {id} belongs to project {found}, expected project {expected}")]
    ProjectMismatch {
        kind: RecordKind,
        id: i64,
        expected: ProjectId,
        found: ProjectId,
    },

    #[error("task {task_id} appears more than once in project {project_id}")]
    DuplicateTask {
        project_id: ProjectId,
        task_id: TaskId,
    },

    #[error(transparent)]
    InvalidTask(#[from] TaskValidationError),

    #[error("dependency would close a cycle: {}", format_path(.path))]
    CycleDetected { path: Vec<TaskId> },

    #[error("a {dependency_type} dependency from task {predecessor} to task {successor} already exists")]
    DuplicateEdge {
        predecessor: TaskId,
        successor: TaskId,
        dependency_type: DependencyType,
    },

    #[error("task {task_id} is not part of project {project_id}")]
    InvalidReference {
        project_id: ProjectId,
        task_id: TaskId,
    },

    #[error("lag {lag_days} is a lead and project {project_id} does not allow leads")]
    LeadNotAllowed { project_id: ProjectId, lag_days: i64 },

    #[error("invalid schedule constraint on task {task_id}{}: {reason}", format_dependency(.dependency_id))]
    InvalidScheduleConstraint {
        task_id: TaskId,
        dependency_id: Option<DependencyId>,
        reason: ConstraintViolation,
    },

    #[error("schedule contains a dependency cycle through tasks {}", format_path(.task_ids))]
    CyclicSchedule { task_ids: Vec<TaskId> },

    #[error("project {project_id} has no start date and none could be inferred")]
    MissingProjectStart { project_id: ProjectId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

fn format_path(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_dependency(dependency_id: &Option<DependencyId>) -> String {
    match dependency_id {
        Some(id) => format!(" (dependency {id})"),
        None => String::new(),
    }
}
