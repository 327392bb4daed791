//! Interfaces to the task and dependency stores that own the records.
//!
//! The engine never persists anything itself: callers load a consistent
//! snapshot through these traits, and only validated edges are handed back
//! to [`DependencyStore::insert_dependency`].

use chrono::NaiveDate;
use thiserror::Error;

use crate::dependency::{Dependency, NewDependency};
use crate::task::Task;
use crate::{DependencyId, ProjectId, TaskId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait TaskStore {
    fn list_tasks(&self, project_id: ProjectId) -> StoreResult<Vec<Task>>;

    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>>;

    /// Start date recorded on the project itself, if the store keeps one.
    fn project_start(&self, _project_id: ProjectId) -> StoreResult<Option<NaiveDate>> {
        Ok(None)
    }
}

pub trait DependencyStore {
    fn list_dependencies(&self, project_id: ProjectId) -> StoreResult<Vec<Dependency>>;

    fn insert_dependency(&mut self, edge: NewDependency) -> StoreResult<DependencyId>;

    fn delete_dependency(&mut self, dependency_id: DependencyId) -> StoreResult<()>;
}

pub mod file;
pub mod memory;

pub use file::{
    ProjectSnapshot, export_schedule_to_csv, load_snapshot_from_json, save_snapshot_to_json,
};
pub use memory::MemoryStore;
