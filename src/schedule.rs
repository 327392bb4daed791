use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::forward_pass::ForwardPass;
use crate::calendar::WorkCalendar;
use crate::error::Result;
use crate::graph::ProjectGraph;
use crate::{ProjectId, TaskId};

/// Derived dates for one task. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub task_id: TaskId,
    pub computed_start: NaiveDate,
    pub computed_end: NaiveDate,
    pub earliest_start: NaiveDate,
    pub earliest_finish: NaiveDate,
    pub latest_start: NaiveDate,
    pub latest_finish: NaiveDate,
    pub slack_days: i64,
    pub on_critical_path: bool,
}

/// Complete schedule for a project, ordered by (start, task_order, id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSchedule {
    pub project_id: ProjectId,
    pub project_start: Option<NaiveDate>,
    pub project_finish: Option<NaiveDate>,
    pub tasks: Vec<ScheduleResult>,
    pub critical_path: Vec<TaskId>,
}

impl ProjectSchedule {
    pub fn empty(project_id: ProjectId) -> Self {
        Self {
            project_id,
            project_start: None,
            project_finish: None,
            tasks: Vec::new(),
            critical_path: Vec::new(),
        }
    }

    pub fn result(&self, task_id: TaskId) -> Option<&ScheduleResult> {
        self.tasks.iter().find(|r| r.task_id == task_id)
    }

    pub fn by_task(&self) -> HashMap<TaskId, &ScheduleResult> {
        self.tasks.iter().map(|r| (r.task_id, r)).collect()
    }

    pub fn summary(&self, graph: &ProjectGraph) -> ScheduleSummary {
        ScheduleSummary {
            task_count: self.tasks.len(),
            critical_count: self.tasks.iter().filter(|r| r.on_critical_path).count(),
            milestone_count: graph.tasks().filter(|t| t.is_milestone).count(),
            critical_path: self.critical_path.clone(),
            project_finish: self.project_finish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub critical_count: usize,
    pub milestone_count: usize,
    pub critical_path: Vec<TaskId>,
    pub project_finish: Option<NaiveDate>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("critical={}", self.critical_count));
        if self.milestone_count > 0 {
            parts.push(format!("milestones={}", self.milestone_count));
        }
        if let Some(date) = self.project_finish {
            parts.push(format!("finish={}", date));
        }
        if !self.critical_path.is_empty() {
            let chain = self
                .critical_path
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("->");
            parts.push(format!("crit_path={}", chain));
        }
        parts.join(", ")
    }
}

/// Pick the date source tasks start from.
///
/// Precedence: the project's own start, then the earliest pin or planned
/// start among its tasks, then the configured fallback.
pub fn resolve_project_start(
    graph: &ProjectGraph,
    stored: Option<NaiveDate>,
    fallback: Option<NaiveDate>,
) -> Option<NaiveDate> {
    stored
        .or_else(|| {
            graph
                .tasks()
                .flat_map(|t| [t.pin.start, t.pin.end, t.planned_start])
                .flatten()
                .min()
        })
        .or(fallback)
}

/// Forward pass, backward pass and slack for the whole project.
///
/// Either every task gets a result or the first diagnosable error is
/// returned; nothing is partially applied.
pub fn compute_schedule(
    graph: &ProjectGraph,
    project_start: NaiveDate,
    calendar: &WorkCalendar,
    allow_negative_lag: bool,
) -> Result<ProjectSchedule> {
    if graph.is_empty() {
        return Ok(ProjectSchedule::empty(graph.project_id()));
    }

    let early = ForwardPass::new(graph, calendar)
        .allow_negative_lag(allow_negative_lag)
        .execute(project_start)?;

    let project_finish = early
        .values()
        .map(|&(_, finish)| finish)
        .max()
        .unwrap_or(project_start);

    let late = BackwardPass::new(graph, calendar).execute(&early, project_finish)?;

    let mut rows: Vec<(ScheduleResult, (i64, TaskId))> = Vec::with_capacity(early.len());
    for task in graph.tasks() {
        let (Some(&(es, ef)), Some(&(ls, lf))) = (early.get(&task.id), late.get(&task.id)) else {
            continue;
        };
        let slack_days = calendar.working_days_between(es, ls);
        rows.push((
            ScheduleResult {
                task_id: task.id,
                computed_start: es,
                computed_end: ef,
                earliest_start: es,
                earliest_finish: ef,
                latest_start: ls,
                latest_finish: lf,
                slack_days,
                on_critical_path: slack_days == 0,
            },
            task.order_key(),
        ));
    }
    rows.sort_by(|a, b| {
        a.0.computed_start
            .cmp(&b.0.computed_start)
            .then_with(|| a.1.cmp(&b.1))
    });

    let tasks: Vec<ScheduleResult> = rows.into_iter().map(|(result, _)| result).collect();
    let critical_path: Vec<TaskId> = tasks
        .iter()
        .filter(|r| r.on_critical_path)
        .map(|r| r.task_id)
        .collect();

    debug!(
        project_id = graph.project_id(),
        tasks = tasks.len(),
        critical = critical_path.len(),
        finish = %project_finish,
        "computed project schedule"
    );

    Ok(ProjectSchedule {
        project_id: graph.project_id(),
        project_start: Some(project_start),
        project_finish: Some(project_finish),
        tasks,
        critical_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{Dependency, DependencyType};
    use crate::task::{SchedulePin, Task};

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_renders_critical_chain() {
        let tasks = vec![Task::new(1, 1, "Dig", 2), Task::new(2, 1, "Pour", 1)];
        let deps = vec![Dependency::new(1, 1, 1, 2, DependencyType::FS)];
        let graph = ProjectGraph::build(1, tasks, deps).unwrap();
        let schedule =
            compute_schedule(&graph, d(2025, 1, 6), &WorkCalendar::default(), true).unwrap();
        assert_eq!(
            schedule.summary(&graph).to_cli_summary(),
            "tasks=2, critical=2, finish=2025-01-08, crit_path=1->2"
        );
    }

    #[test]
    fn project_start_falls_back_to_earliest_pin() {
        let mut pinned = Task::new(1, 1, "Survey", 1);
        pinned.pin = SchedulePin::start(d(2025, 2, 3));
        let mut planned = Task::new(2, 1, "Permit", 1);
        planned.planned_start = Some(d(2025, 1, 20));
        let graph = ProjectGraph::build(1, vec![pinned, planned], Vec::new()).unwrap();

        assert_eq!(
            resolve_project_start(&graph, None, Some(d(2024, 1, 1))),
            Some(d(2025, 1, 20))
        );
        assert_eq!(
            resolve_project_start(&graph, Some(d(2025, 1, 1)), None),
            Some(d(2025, 1, 1))
        );
    }

    #[test]
    fn empty_project_has_empty_schedule() {
        let graph = ProjectGraph::build(9, Vec::new(), Vec::new()).unwrap();
        let schedule =
            compute_schedule(&graph, d(2025, 1, 1), &WorkCalendar::default(), true).unwrap();
        assert!(schedule.tasks.is_empty());
        assert!(schedule.critical_path.is_empty());
    }
}
