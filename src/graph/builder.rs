use petgraph::Direction;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::dependency::{Dependency, DependencyType};
use crate::error::{RecordKind, Result, ScheduleError};
use crate::task::{Task, validate_task};
use crate::{ProjectId, TaskId};

/// Immutable dependency graph for one project.
///
/// Nodes are task ids, edges carry the dependency record (predecessor ->
/// successor). Built fresh from the store for every request.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    project_id: ProjectId,
    graph: DiGraph<TaskId, Dependency>,
    id_to_index: HashMap<TaskId, NodeIndex>,
    tasks: HashMap<TaskId, Task>,
}

impl ProjectGraph {
    pub fn build(
        project_id: ProjectId,
        tasks: Vec<Task>,
        dependencies: Vec<Dependency>,
    ) -> Result<Self> {
        let mut tasks = tasks;
        tasks.sort_by_key(Task::order_key);

        let mut graph: DiGraph<TaskId, Dependency> =
            DiGraph::with_capacity(tasks.len(), dependencies.len());
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut task_map: HashMap<TaskId, Task> = HashMap::with_capacity(tasks.len());

        // Add nodes first
        for task in tasks {
            if task.project_id != project_id {
                return Err(ScheduleError::ProjectMismatch {
                    kind: RecordKind::Task,
                    id: task.id,
                    expected: project_id,
                    found: task.project_id,
                });
            }
            if id_to_index.contains_key(&task.id) {
                return Err(ScheduleError::DuplicateTask {
                    project_id,
                    task_id: task.id,
                });
            }
            validate_task(&task)?;
            let node_ix = graph.add_node(task.id);
            id_to_index.insert(task.id, node_ix);
            task_map.insert(task.id, task);
        }

        // Add edges: pred -> succ
        let mut dependencies = dependencies;
        dependencies.sort_by_key(|dep| dep.id);
        for dep in dependencies {
            if dep.project_id != project_id {
                return Err(ScheduleError::ProjectMismatch {
                    kind: RecordKind::Dependency,
                    id: dep.id,
                    expected: project_id,
                    found: dep.project_id,
                });
            }
            let lookup = |task_id: TaskId| {
                id_to_index
                    .get(&task_id)
                    .copied()
                    .ok_or(ScheduleError::MissingReference {
                        project_id,
                        dependency_id: dep.id,
                        task_id,
                    })
            };
            let u = lookup(dep.predecessor_task_id)?;
            let v = lookup(dep.successor_task_id)?;
            graph.add_edge(u, v, dep);
        }

        debug!(
            project_id,
            tasks = graph.node_count(),
            dependencies = graph.edge_count(),
            "built project graph"
        );

        Ok(Self {
            project_id,
            graph,
            id_to_index,
            tasks: task_map,
        })
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.id_to_index.contains_key(&task_id)
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// Tasks in (task_order, id) order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.graph
            .node_indices()
            .filter_map(move |ix| self.tasks.get(&self.graph[ix]))
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.graph.edge_weights()
    }

    /// Outgoing edges of `task_id`, ordered by dependency id.
    pub fn successors_of(&self, task_id: TaskId) -> Vec<&Dependency> {
        self.edges(task_id, Direction::Outgoing)
    }

    /// Incoming edges of `task_id`, ordered by dependency id.
    pub fn predecessors_of(&self, task_id: TaskId) -> Vec<&Dependency> {
        self.edges(task_id, Direction::Incoming)
    }

    fn edges(&self, task_id: TaskId, direction: Direction) -> Vec<&Dependency> {
        let Some(&node_ix) = self.id_to_index.get(&task_id) else {
            return Vec::new();
        };
        let mut edges: Vec<&Dependency> = self
            .graph
            .edges_directed(node_ix, direction)
            .map(|edge| edge.weight())
            .collect();
        edges.sort_by_key(|dep| dep.id);
        edges
    }

    pub fn has_edge(
        &self,
        predecessor: TaskId,
        successor: TaskId,
        dependency_type: DependencyType,
    ) -> bool {
        self.successors_of(predecessor).into_iter().any(|dep| {
            dep.successor_task_id == successor && dep.dependency_type == dependency_type
        })
    }

    /// Tasks without incoming edges.
    pub fn sources(&self) -> Vec<TaskId> {
        self.graph
            .node_indices()
            .filter(|&ix| {
                self.graph
                    .neighbors_directed(ix, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|ix| self.graph[ix])
            .collect()
    }

    /// Task ids in dependency order; fails with the offending component on a cycle.
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        if let Some(dep) = self
            .dependencies()
            .find(|dep| dep.predecessor_task_id == dep.successor_task_id)
        {
            return Err(ScheduleError::CyclicSchedule {
                task_ids: vec![dep.predecessor_task_id],
            });
        }
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order.into_iter().map(|ix| self.graph[ix]).collect()),
            Err(cycle) => Err(ScheduleError::CyclicSchedule {
                task_ids: self.cycle_members(cycle.node_id()),
            }),
        }
    }

    fn cycle_members(&self, node_ix: NodeIndex) -> Vec<TaskId> {
        let component = tarjan_scc(&self.graph)
            .into_iter()
            .find(|component| component.contains(&node_ix))
            .unwrap_or_else(|| vec![node_ix]);
        let mut ids: Vec<TaskId> = component
            .into_iter()
            .map(|ix| self.graph[ix])
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ids.sort_unstable();
        ids
    }
}
