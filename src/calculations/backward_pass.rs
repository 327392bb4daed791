use chrono::NaiveDate;

use super::{DateMap, offset};
use crate::DependencyId;
use crate::calendar::WorkCalendar;
use crate::error::{ConstraintViolation, Result, ScheduleError};
use crate::graph::ProjectGraph;

/// Derives latest start and finish dates in reverse topological order.
///
/// Edges into pinned tasks do not constrain their predecessors, mirroring the
/// forward pass where a pin overrides its incoming edges.
pub struct BackwardPass<'a> {
    graph: &'a ProjectGraph,
    calendar: &'a WorkCalendar,
}

impl<'a> BackwardPass<'a> {
    pub fn new(graph: &'a ProjectGraph, calendar: &'a WorkCalendar) -> Self {
        Self { graph, calendar }
    }

    pub fn execute(&self, early: &DateMap, project_end: NaiveDate) -> Result<DateMap> {
        let mut order = self.graph.topological_order()?;
        order.reverse();

        let mut late = DateMap::with_capacity(order.len());
        for task_id in order {
            let Some(&(early_start, early_finish)) = early.get(&task_id) else {
                continue;
            };
            // Span of the task as scheduled, so pinned spans stay intact.
            let span = self.calendar.working_days_between(early_start, early_finish);
            let out_of_range = |dependency_id: Option<DependencyId>| {
                ScheduleError::InvalidScheduleConstraint {
                    task_id,
                    dependency_id,
                    reason: ConstraintViolation::DateOutOfRange,
                }
            };

            let mut late_finish = project_end;
            for dep in self.graph.successors_of(task_id) {
                let Some(successor) = self.graph.task(dep.successor_task_id) else {
                    continue;
                };
                if successor.pin.is_set() {
                    continue;
                }
                let Some(&(succ_late_start, _)) = late.get(&successor.id) else {
                    continue;
                };
                let edge_out_of_range = || out_of_range(Some(dep.id));
                let latest_anchor = dep
                    .dependency_type
                    .start_offset(dep.lag_days, successor.effective_duration())
                    .and_then(i64::checked_neg)
                    .and_then(|back| offset(self.calendar, succ_late_start, back))
                    .ok_or_else(edge_out_of_range)?;
                let candidate = if dep.dependency_type.anchors_on_finish() {
                    latest_anchor
                } else {
                    offset(self.calendar, latest_anchor, span).ok_or_else(edge_out_of_range)?
                };
                if candidate < late_finish {
                    late_finish = candidate;
                }
            }

            let late_start =
                offset(self.calendar, late_finish, -span).ok_or_else(|| out_of_range(None))?;
            late.insert(task_id, (late_start, late_finish));
        }

        Ok(late)
    }
}
