//! Acceptance check for a proposed dependency edge.
//!
//! A candidate `pred -> succ` closes a cycle exactly when `pred` is already
//! reachable from `succ`. The search follows successor edges over the whole
//! graph, so cycles of any length are caught, not only the direct reverse
//! edge.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::ProjectGraph;
use crate::dependency::NewDependency;
use crate::error::{Result, ScheduleError};
use crate::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DependencyValidation {
    Accepted,
    /// The edge would close this cycle; the path starts and ends at the predecessor.
    CycleDetected { path: Vec<TaskId> },
    DuplicateEdge,
    InvalidReference { task_id: TaskId },
    LeadNotAllowed { lag_days: i64 },
}

impl DependencyValidation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DependencyValidation::Accepted)
    }

    pub fn into_result(self, candidate: &NewDependency) -> Result<()> {
        match self {
            DependencyValidation::Accepted => Ok(()),
            DependencyValidation::CycleDetected { path } => {
                Err(ScheduleError::CycleDetected { path })
            }
            DependencyValidation::DuplicateEdge => Err(ScheduleError::DuplicateEdge {
                predecessor: candidate.predecessor_task_id,
                successor: candidate.successor_task_id,
                dependency_type: candidate.dependency_type,
            }),
            DependencyValidation::InvalidReference { task_id } => {
                Err(ScheduleError::InvalidReference {
                    project_id: candidate.project_id,
                    task_id,
                })
            }
            DependencyValidation::LeadNotAllowed { lag_days } => {
                Err(ScheduleError::LeadNotAllowed {
                    project_id: candidate.project_id,
                    lag_days,
                })
            }
        }
    }
}

pub fn validate_dependency(
    graph: &ProjectGraph,
    candidate: &NewDependency,
    allow_negative_lag: bool,
) -> DependencyValidation {
    let pred = candidate.predecessor_task_id;
    let succ = candidate.successor_task_id;

    for task_id in [pred, succ] {
        if candidate.project_id != graph.project_id() || !graph.contains(task_id) {
            return DependencyValidation::InvalidReference { task_id };
        }
    }

    if pred == succ {
        return DependencyValidation::CycleDetected {
            path: vec![pred, pred],
        };
    }

    if graph.has_edge(pred, succ, candidate.dependency_type) {
        return DependencyValidation::DuplicateEdge;
    }

    if candidate.lag_days < 0 && !allow_negative_lag {
        return DependencyValidation::LeadNotAllowed {
            lag_days: candidate.lag_days,
        };
    }

    match find_path(graph, succ, pred) {
        Some(path) => {
            let mut cycle = Vec::with_capacity(path.len() + 1);
            cycle.push(pred);
            cycle.extend(path);
            DependencyValidation::CycleDetected { path: cycle }
        }
        None => DependencyValidation::Accepted,
    }
}

/// Depth-first search along successor edges; returns the path `from ..= to`.
pub fn find_path(graph: &ProjectGraph, from: TaskId, to: TaskId) -> Option<Vec<TaskId>> {
    let mut parent: HashMap<TaskId, TaskId> = HashMap::new();
    let mut visited: HashSet<TaskId> = HashSet::from([from]);
    let mut stack = vec![from];

    while let Some(current) = stack.pop() {
        if current == to {
            let mut path = vec![current];
            let mut node = current;
            while let Some(&prev) = parent.get(&node) {
                path.push(prev);
                node = prev;
            }
            path.reverse();
            return Some(path);
        }
        // Reverse so the lowest dependency id is explored first.
        for dep in graph.successors_of(current).into_iter().rev() {
            let next = dep.successor_task_id;
            if visited.insert(next) {
                parent.insert(next, current);
                stack.push(next);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{Dependency, DependencyType};
    use crate::task::Task;

    fn chain(ids: &[TaskId]) -> ProjectGraph {
        let tasks = ids.iter().map(|&id| Task::new(id, 1, format!("T{id}"), 1)).collect();
        let deps = ids
            .windows(2)
            .enumerate()
            .map(|(i, w)| Dependency::new(i as i64 + 1, 1, w[0], w[1], DependencyType::FS))
            .collect();
        ProjectGraph::build(1, tasks, deps).unwrap()
    }

    fn candidate(pred: TaskId, succ: TaskId) -> NewDependency {
        NewDependency {
            project_id: 1,
            predecessor_task_id: pred,
            successor_task_id: succ,
            dependency_type: DependencyType::FS,
            lag_days: 0,
        }
    }

    #[test]
    fn long_cycle_is_found_through_reachability() {
        let graph = chain(&[1, 2, 3, 4, 5]);
        let outcome = validate_dependency(&graph, &candidate(5, 1), true);
        assert_eq!(
            outcome,
            DependencyValidation::CycleDetected {
                path: vec![5, 1, 2, 3, 4, 5]
            }
        );
    }

    #[test]
    fn forward_shortcut_is_accepted() {
        let graph = chain(&[1, 2, 3]);
        assert!(validate_dependency(&graph, &candidate(1, 3), true).is_accepted());
    }

    #[test]
    fn rejection_converts_to_structured_error() {
        let graph = chain(&[1, 2]);
        let edge = candidate(1, 2);
        let err = validate_dependency(&graph, &edge, true)
            .into_result(&edge)
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DuplicateEdge {
                predecessor: 1,
                successor: 2,
                dependency_type: DependencyType::FS
            }
        ));
    }
}
