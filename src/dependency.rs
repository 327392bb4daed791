use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{DependencyId, ProjectId, TaskId};

/// Relationship between the predecessor's and the successor's dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DependencyType {
    /// Finish-to-start.
    #[default]
    FS,
    /// Start-to-start.
    SS,
    /// Finish-to-finish.
    FF,
    /// Start-to-finish.
    SF,
}

impl DependencyType {
    pub const ALL: [DependencyType; 4] = [
        DependencyType::FS,
        DependencyType::SS,
        DependencyType::FF,
        DependencyType::SF,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FS => "FS",
            DependencyType::SS => "SS",
            DependencyType::FF => "FF",
            DependencyType::SF => "SF",
        }
    }

    /// True when the constraint hangs off the predecessor's finish rather than its start.
    pub fn anchors_on_finish(&self) -> bool {
        matches!(self, DependencyType::FS | DependencyType::FF)
    }

    /// Working-day offset from the predecessor anchor to the earliest successor start.
    ///
    /// FS: end + lag + 1, SS: start + lag, FF: end + lag - duration + 1,
    /// SF: start + lag - duration + 1. `None` when the offset overflows.
    pub fn start_offset(&self, lag_days: i64, successor_duration: i64) -> Option<i64> {
        match self {
            DependencyType::FS => lag_days.checked_add(1),
            DependencyType::SS => Some(lag_days),
            DependencyType::FF | DependencyType::SF => lag_days
                .checked_sub(successor_duration)?
                .checked_add(1),
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "FS" | "FINISH_TO_START" => Ok(DependencyType::FS),
            "SS" | "START_TO_START" => Ok(DependencyType::SS),
            "FF" | "FINISH_TO_FINISH" => Ok(DependencyType::FF),
            "SF" | "START_TO_FINISH" => Ok(DependencyType::SF),
            other => Err(format!(
                "unknown dependency type '{other}' (expected one of {})",
                DependencyType::ALL.map(|t| t.as_str()).join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: DependencyId,
    pub project_id: ProjectId,
    pub predecessor_task_id: TaskId,
    pub successor_task_id: TaskId,
    #[serde(rename = "type", default)]
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub lag_days: i64,
}

impl Dependency {
    pub fn new(
        id: DependencyId,
        project_id: ProjectId,
        predecessor_task_id: TaskId,
        successor_task_id: TaskId,
        dependency_type: DependencyType,
    ) -> Self {
        Self {
            id,
            project_id,
            predecessor_task_id,
            successor_task_id,
            dependency_type,
            lag_days: 0,
        }
    }

    pub fn with_lag(mut self, lag_days: i64) -> Self {
        self.lag_days = lag_days;
        self
    }
}

/// A dependency that has not been persisted yet and therefore has no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDependency {
    pub project_id: ProjectId,
    pub predecessor_task_id: TaskId,
    pub successor_task_id: TaskId,
    #[serde(rename = "type", default)]
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub lag_days: i64,
}

impl NewDependency {
    pub fn into_dependency(self, id: DependencyId) -> Dependency {
        Dependency {
            id,
            project_id: self.project_id,
            predecessor_task_id: self.predecessor_task_id,
            successor_task_id: self.successor_task_id,
            dependency_type: self.dependency_type,
            lag_days: self.lag_days,
        }
    }
}
