//! Chart-facing projection of a computed schedule.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::TaskId;
use crate::dependency::Dependency;
use crate::schedule::ProjectSchedule;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleClass {
    Milestone,
    Completed,
    InProgress,
    NotStarted,
}

impl StyleClass {
    pub fn for_task(task: &Task) -> Self {
        if task.is_milestone {
            StyleClass::Milestone
        } else if task.is_complete() {
            StyleClass::Completed
        } else if task.status == TaskStatus::InProgress || task.progress_percentage > 0.0 {
            StyleClass::InProgress
        } else {
            StyleClass::NotStarted
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttTask {
    pub id: String,
    pub name: String,
    pub start: String,
    pub end: String,
    pub progress: u8,
    pub dependencies: Vec<String>,
    pub style_class: StyleClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No computed dates exist for the task in the supplied schedule.
    Unscheduled,
    /// The task belongs to a different project than the schedule.
    ForeignProject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTask {
    pub task_id: TaskId,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttProjection {
    pub tasks: Vec<GanttTask>,
    pub excluded: Vec<ExcludedTask>,
}

pub fn project_to_gantt(
    tasks: &[Task],
    dependencies: &[Dependency],
    schedule: &ProjectSchedule,
) -> GanttProjection {
    let results = schedule.by_task();
    let mut excluded = Vec::new();
    let mut included: HashMap<TaskId, &Task> = HashMap::with_capacity(tasks.len());

    for task in tasks {
        let reason = if task.project_id != schedule.project_id {
            Some(ExclusionReason::ForeignProject)
        } else if !results.contains_key(&task.id) {
            Some(ExclusionReason::Unscheduled)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                warn!(
                    task_id = task.id,
                    project_id = schedule.project_id,
                    ?reason,
                    "excluding task from gantt projection"
                );
                excluded.push(ExcludedTask {
                    task_id: task.id,
                    reason,
                });
            }
            None => {
                included.insert(task.id, task);
            }
        }
    }

    let included_ids: HashSet<TaskId> = included.keys().copied().collect();
    let mut predecessors: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
    for dep in dependencies {
        if !included_ids.contains(&dep.successor_task_id) {
            continue;
        }
        if !included_ids.contains(&dep.predecessor_task_id) {
            debug!(
                dependency_id = dep.id,
                predecessor = dep.predecessor_task_id,
                "dropping edge to excluded predecessor"
            );
            continue;
        }
        predecessors
            .entry(dep.successor_task_id)
            .or_default()
            .push(dep.predecessor_task_id);
    }

    let mut rows = Vec::with_capacity(included.len());
    for result in &schedule.tasks {
        let Some(task) = included.get(&result.task_id) else {
            continue;
        };
        let mut deps = predecessors.remove(&task.id).unwrap_or_default();
        deps.sort_unstable();
        deps.dedup();
        rows.push(GanttTask {
            id: task.id.to_string(),
            name: task.name.clone(),
            start: result.computed_start.format("%Y-%m-%d").to_string(),
            end: result.computed_end.format("%Y-%m-%d").to_string(),
            progress: task.progress_percentage.clamp(0.0, 100.0).round() as u8,
            dependencies: deps.into_iter().map(|id| id.to_string()).collect(),
            style_class: StyleClass::for_task(task),
        });
    }

    GanttProjection {
        tasks: rows,
        excluded,
    }
}
