use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use super::{DependencyStore, StoreError, StoreResult, TaskStore};
use crate::dependency::{Dependency, NewDependency};
use crate::task::Task;
use crate::{DependencyId, ProjectId, TaskId};

/// In-memory task and dependency store.
///
/// Enforces the same integrity rules a relational store would: unique
/// (predecessor, successor, type) triples, endpoints inside one project, and
/// cascading removal of incident edges when a task is deleted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tasks: BTreeMap<TaskId, Task>,
    dependencies: BTreeMap<DependencyId, Dependency>,
    project_starts: HashMap<ProjectId, NaiveDate>,
    next_dependency_id: DependencyId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_dependency_id: 1,
            ..Self::default()
        }
    }

    pub fn set_project_start(&mut self, project_id: ProjectId, date: NaiveDate) {
        self.project_starts.insert(project_id, date);
    }

    /// Insert or replace a task record.
    pub fn upsert_task(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    /// Delete a task together with every dependency touching it.
    pub fn delete_task(&mut self, task_id: TaskId) -> StoreResult<Task> {
        let task = self.tasks.remove(&task_id).ok_or(StoreError::NotFound {
            kind: "task",
            id: task_id,
        })?;
        self.dependencies.retain(|_, dep| {
            dep.predecessor_task_id != task_id && dep.successor_task_id != task_id
        });
        Ok(task)
    }

    /// Store an already-identified dependency record, e.g. when loading a snapshot.
    pub fn restore_dependency(&mut self, dependency: Dependency) -> StoreResult<()> {
        self.check_integrity(&NewDependency {
            project_id: dependency.project_id,
            predecessor_task_id: dependency.predecessor_task_id,
            successor_task_id: dependency.successor_task_id,
            dependency_type: dependency.dependency_type,
            lag_days: dependency.lag_days,
        })?;
        if self.dependencies.contains_key(&dependency.id) {
            return Err(StoreError::Conflict(format!(
                "dependency id {} already exists",
                dependency.id
            )));
        }
        let following = dependency.id.checked_add(1).ok_or_else(|| {
            StoreError::InvalidData(format!("dependency id {} is out of range", dependency.id))
        })?;
        self.next_dependency_id = self.next_dependency_id.max(following);
        self.dependencies.insert(dependency.id, dependency);
        Ok(())
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    fn check_integrity(&self, edge: &NewDependency) -> StoreResult<()> {
        if edge.predecessor_task_id == edge.successor_task_id {
            return Err(StoreError::Conflict(format!(
                "task {} cannot depend on itself",
                edge.predecessor_task_id
            )));
        }
        for task_id in [edge.predecessor_task_id, edge.successor_task_id] {
            match self.tasks.get(&task_id) {
                Some(task) if task.project_id == edge.project_id => {}
                Some(task) => {
                    return Err(StoreError::Conflict(format!(
                        "task {} belongs to project {}, not {}",
                        task_id, task.project_id, edge.project_id
                    )));
                }
                None => {
                    return Err(StoreError::NotFound {
                        kind: "task",
                        id: task_id,
                    });
                }
            }
        }
        let duplicate = self.dependencies.values().any(|dep| {
            dep.predecessor_task_id == edge.predecessor_task_id
                && dep.successor_task_id == edge.successor_task_id
                && dep.dependency_type == edge.dependency_type
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "{} dependency {} -> {} already exists",
                edge.dependency_type, edge.predecessor_task_id, edge.successor_task_id
            )));
        }
        Ok(())
    }
}

impl TaskStore for MemoryStore {
    fn list_tasks(&self, project_id: ProjectId) -> StoreResult<Vec<Task>> {
        Ok(self
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect())
    }

    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.tasks.get(&task_id).cloned())
    }

    fn project_start(&self, project_id: ProjectId) -> StoreResult<Option<NaiveDate>> {
        Ok(self.project_starts.get(&project_id).copied())
    }
}

impl DependencyStore for MemoryStore {
    fn list_dependencies(&self, project_id: ProjectId) -> StoreResult<Vec<Dependency>> {
        Ok(self
            .dependencies
            .values()
            .filter(|dep| dep.project_id == project_id)
            .cloned()
            .collect())
    }

    fn insert_dependency(&mut self, edge: NewDependency) -> StoreResult<DependencyId> {
        self.check_integrity(&edge)?;
        let id = self.next_dependency_id.max(1);
        self.next_dependency_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Conflict("dependency ids exhausted".to_string()))?;
        self.dependencies.insert(id, edge.into_dependency(id));
        Ok(id)
    }

    fn delete_dependency(&mut self, dependency_id: DependencyId) -> StoreResult<()> {
        self.dependencies
            .remove(&dependency_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound {
                kind: "dependency",
                id: dependency_id,
            })
    }
}
