use chrono::NaiveDate;
use tracing::{debug, info};

use crate::calendar::WorkCalendar;
use crate::config::{ConfigError, EngineConfig};
use crate::dependency::{DependencyType, NewDependency};
use crate::error::{Result, ScheduleError};
use crate::gantt::{GanttProjection, project_to_gantt};
use crate::graph::{DependencyValidation, ProjectGraph, validate_dependency};
use crate::persistence::{DependencyStore, TaskStore};
use crate::progress::{ProgressSummary, summarize_progress};
use crate::schedule::{ProjectSchedule, compute_schedule, resolve_project_start};
use crate::{DependencyId, ProjectId, TaskId};

/// Service object wiring stores, calendar and the scheduling passes.
///
/// Holds only its configuration; every call rebuilds the project graph from
/// the store, so the engine can be shared freely between callers.
#[derive(Debug, Clone)]
pub struct ScheduleEngine {
    config: EngineConfig,
    calendar: WorkCalendar,
}

impl ScheduleEngine {
    pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let calendar = WorkCalendar::from_config(&config.calendar)?;
        info!(
            working_days = config.calendar.working_days().len(),
            holidays = config.calendar.holidays().len(),
            allow_negative_lag = config.allow_negative_lag,
            "schedule engine initialised"
        );
        Ok(Self { config, calendar })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    /// Load the project's records and materialize its graph.
    pub fn load_graph<S>(&self, store: &S, project_id: ProjectId) -> Result<ProjectGraph>
    where
        S: TaskStore + DependencyStore,
    {
        let tasks = store.list_tasks(project_id)?;
        let dependencies = store.list_dependencies(project_id)?;
        ProjectGraph::build(project_id, tasks, dependencies)
    }

    pub fn compute_schedule<S>(&self, store: &S, project_id: ProjectId) -> Result<ProjectSchedule>
    where
        S: TaskStore + DependencyStore,
    {
        let graph = self.load_graph(store, project_id)?;
        self.schedule_graph(store, &graph)
    }

    /// Schedule an already-built graph, resolving the project start through `store`.
    pub fn schedule_graph<S>(&self, store: &S, graph: &ProjectGraph) -> Result<ProjectSchedule>
    where
        S: TaskStore,
    {
        if graph.is_empty() {
            return Ok(ProjectSchedule::empty(graph.project_id()));
        }
        let stored_start = store.project_start(graph.project_id())?;
        let project_start =
            resolve_project_start(graph, stored_start, self.config.default_project_start).ok_or(
                ScheduleError::MissingProjectStart {
                    project_id: graph.project_id(),
                },
            )?;
        compute_schedule(
            graph,
            project_start,
            &self.calendar,
            self.config.allow_negative_lag,
        )
    }

    pub fn validate_new_dependency<S>(
        &self,
        store: &S,
        project_id: ProjectId,
        predecessor: TaskId,
        successor: TaskId,
        dependency_type: DependencyType,
        lag_days: i64,
    ) -> Result<DependencyValidation>
    where
        S: TaskStore + DependencyStore,
    {
        let graph = self.load_graph(store, project_id)?;
        let candidate = NewDependency {
            project_id,
            predecessor_task_id: predecessor,
            successor_task_id: successor,
            dependency_type,
            lag_days,
        };
        Ok(validate_dependency(
            &graph,
            &candidate,
            self.config.allow_negative_lag,
        ))
    }

    /// Validate the edge against a fresh graph and persist it only when accepted.
    pub fn create_dependency<S>(&self, store: &mut S, edge: NewDependency) -> Result<DependencyId>
    where
        S: TaskStore + DependencyStore,
    {
        let graph = self.load_graph(&*store, edge.project_id)?;
        let outcome = validate_dependency(&graph, &edge, self.config.allow_negative_lag);
        debug!(
            project_id = edge.project_id,
            predecessor = edge.predecessor_task_id,
            successor = edge.successor_task_id,
            ?outcome,
            "validated dependency"
        );
        outcome.into_result(&edge)?;

        let project_id = edge.project_id;
        let id = store.insert_dependency(edge)?;
        info!(project_id, dependency_id = id, "dependency created");
        Ok(id)
    }

    pub fn project_to_gantt<S>(&self, store: &S, schedule: &ProjectSchedule) -> Result<GanttProjection>
    where
        S: TaskStore + DependencyStore,
    {
        let tasks = store.list_tasks(schedule.project_id)?;
        let dependencies = store.list_dependencies(schedule.project_id)?;
        Ok(project_to_gantt(&tasks, &dependencies, schedule))
    }

    pub fn progress_summary<S>(
        &self,
        store: &S,
        schedule: &ProjectSchedule,
        today: NaiveDate,
    ) -> Result<ProgressSummary>
    where
        S: TaskStore,
    {
        let tasks = store.list_tasks(schedule.project_id)?;
        Ok(summarize_progress(
            &tasks,
            schedule,
            today,
            self.config.milestone_weight_days,
        ))
    }
}
