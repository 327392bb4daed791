use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use super::{DependencyStore, MemoryStore, StoreError, StoreResult, TaskStore};
use crate::ProjectId;
use crate::dependency::Dependency;
use crate::schedule::ProjectSchedule;
use crate::task::{Task, validate_task_collection};

/// Serialized form of one project's task and dependency records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_start: Option<NaiveDate>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ProjectSnapshot {
    pub fn from_store<S>(store: &S, project_id: ProjectId) -> StoreResult<Self>
    where
        S: TaskStore + DependencyStore,
    {
        Ok(Self {
            project_id,
            project_start: store.project_start(project_id)?,
            tasks: store.list_tasks(project_id)?,
            dependencies: store.list_dependencies(project_id)?,
        })
    }

    pub fn into_store(self) -> StoreResult<MemoryStore> {
        validate_task_collection(&self.tasks)
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;

        let mut store = MemoryStore::new();
        if let Some(start) = self.project_start {
            store.set_project_start(self.project_id, start);
        }
        for task in self.tasks {
            store.upsert_task(task);
        }
        for dependency in self.dependencies {
            store.restore_dependency(dependency)?;
        }
        Ok(store)
    }
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &ProjectSnapshot,
    path: P,
) -> StoreResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> StoreResult<ProjectSnapshot> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    Ok(snapshot)
}

#[derive(Serialize)]
struct ScheduleCsvRecord<'a> {
    task_id: i64,
    name: &'a str,
    computed_start: String,
    computed_end: String,
    earliest_start: String,
    earliest_finish: String,
    latest_start: String,
    latest_finish: String,
    slack_days: i64,
    on_critical_path: bool,
    status: &'a str,
}

/// Write one row per scheduled task, in schedule order.
pub fn export_schedule_to_csv<P: AsRef<Path>>(
    schedule: &ProjectSchedule,
    tasks: &[Task],
    path: P,
) -> StoreResult<()> {
    let by_id: HashMap<i64, &Task> = tasks.iter().map(|t| (t.id, t)).collect();
    let mut writer = csv::Writer::from_path(path)?;
    for result in &schedule.tasks {
        let task = by_id.get(&result.task_id);
        writer.serialize(ScheduleCsvRecord {
            task_id: result.task_id,
            name: task.map_or("", |t| t.name.as_str()),
            computed_start: format_date(result.computed_start),
            computed_end: format_date(result.computed_end),
            earliest_start: format_date(result.earliest_start),
            earliest_finish: format_date(result.earliest_finish),
            latest_start: format_date(result.latest_start),
            latest_finish: format_date(result.latest_finish),
            slack_days: result.slack_days,
            on_critical_path: result.on_critical_path,
            status: task.map_or("", |t| t.status.as_str()),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
