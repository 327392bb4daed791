pub mod calculations;
pub mod calendar;
pub mod config;
pub mod dependency;
pub mod engine;
pub mod error;
pub mod gantt;
pub mod graph;
#[cfg(feature = "cli")]
pub mod logging;
pub mod persistence;
pub mod progress;
pub mod schedule;
pub mod task;

pub type TaskId = i64;
pub type ProjectId = i64;
pub type DependencyId = i64;

pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use config::{ConfigError, EngineConfig};
pub use dependency::{Dependency, DependencyType, NewDependency};
pub use engine::ScheduleEngine;
pub use error::{ConstraintViolation, ScheduleError};
pub use gantt::{GanttProjection, GanttTask, StyleClass, project_to_gantt};
pub use graph::{DependencyValidation, ProjectGraph, validate_dependency};
pub use persistence::{
    DependencyStore, MemoryStore, ProjectSnapshot, StoreError, TaskStore, export_schedule_to_csv,
    load_snapshot_from_json, save_snapshot_to_json,
};
pub use progress::{ProgressSummary, aggregate_progress, is_overdue, summarize_progress};
pub use schedule::{ProjectSchedule, ScheduleResult, ScheduleSummary, compute_schedule};
pub use task::{SchedulePin, Task, TaskStatus};
