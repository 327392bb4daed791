use chrono::NaiveDate;
use tracing::warn;

use super::{DateMap, finish_from_start, start_from_finish};
use crate::calendar::WorkCalendar;
use crate::dependency::Dependency;
use crate::error::{ConstraintViolation, Result, ScheduleError};
use crate::graph::ProjectGraph;
use crate::task::Task;

/// Derives computed (earliest) start and finish dates in topological order.
pub struct ForwardPass<'a> {
    graph: &'a ProjectGraph,
    calendar: &'a WorkCalendar,
    allow_negative_lag: bool,
}

impl<'a> ForwardPass<'a> {
    pub fn new(graph: &'a ProjectGraph, calendar: &'a WorkCalendar) -> Self {
        Self {
            graph,
            calendar,
            allow_negative_lag: true,
        }
    }

    pub fn allow_negative_lag(mut self, allow: bool) -> Self {
        self.allow_negative_lag = allow;
        self
    }

    pub fn execute(&self, project_start: NaiveDate) -> Result<DateMap> {
        let order = self.graph.topological_order()?;
        let mut dates = DateMap::with_capacity(order.len());

        for task_id in order {
            let Some(task) = self.graph.task(task_id) else {
                continue;
            };
            let duration = task.effective_duration();
            let required = self.required_start(task, &dates, project_start)?;

            let (start, finish) = match (task.pin.start, task.pin.end) {
                (Some(start), Some(end)) => (start, end),
                (Some(start), None) => (start, self.finish_for(task, start, duration)?),
                (None, Some(end)) => {
                    let start = start_from_finish(self.calendar, end, duration)
                        .ok_or_else(|| out_of_range(task, None))?;
                    (start, end)
                }
                (None, None) => {
                    let base = required
                        .unwrap_or_else(|| task.planned_start.unwrap_or(project_start));
                    let start = self
                        .calendar
                        .shift(base, 0)
                        .ok_or_else(|| out_of_range(task, None))?;
                    (start, self.finish_for(task, start, duration)?)
                }
            };

            if task.pin.is_set() {
                if let Some(required) = required.filter(|required| *required > start) {
                    warn!(
                        task_id,
                        pinned_start = %start,
                        required_start = %required,
                        "pinned start is earlier than its dependencies allow"
                    );
                }
            }

            if finish < start {
                return Err(ScheduleError::InvalidScheduleConstraint {
                    task_id,
                    dependency_id: None,
                    reason: ConstraintViolation::EndBeforeStart { start, end: finish },
                });
            }
            dates.insert(task_id, (start, finish));
        }

        Ok(dates)
    }

    /// Latest start demanded by the incoming edges, `None` for source tasks.
    fn required_start(
        &self,
        task: &Task,
        dates: &DateMap,
        project_start: NaiveDate,
    ) -> Result<Option<NaiveDate>> {
        let duration = task.effective_duration();
        let mut required: Option<NaiveDate> = None;
        for dep in self.graph.predecessors_of(task.id) {
            self.check_lag(task, dep)?;
            let (pred_start, pred_finish) = dates
                .get(&dep.predecessor_task_id)
                .copied()
                .unwrap_or((project_start, project_start));
            let anchor = if dep.dependency_type.anchors_on_finish() {
                pred_finish
            } else {
                pred_start
            };
            let candidate = dep
                .dependency_type
                .start_offset(dep.lag_days, duration)
                .and_then(|offset| self.calendar.shift(anchor, offset))
                .ok_or_else(|| out_of_range(task, Some(dep)))?;
            required = Some(required.map_or(candidate, |current| current.max(candidate)));
        }
        Ok(required)
    }

    fn check_lag(&self, task: &Task, dep: &Dependency) -> Result<()> {
        if dep.lag_days < 0 && !self.allow_negative_lag {
            return Err(ScheduleError::InvalidScheduleConstraint {
                task_id: task.id,
                dependency_id: Some(dep.id),
                reason: ConstraintViolation::LeadNotAllowed(dep.lag_days),
            });
        }
        Ok(())
    }

    fn finish_for(&self, task: &Task, start: NaiveDate, duration: i64) -> Result<NaiveDate> {
        finish_from_start(self.calendar, start, duration).ok_or_else(|| out_of_range(task, None))
    }
}

fn out_of_range(task: &Task, dep: Option<&Dependency>) -> ScheduleError {
    ScheduleError::InvalidScheduleConstraint {
        task_id: task.id,
        dependency_id: dep.map(|d| d.id),
        reason: ConstraintViolation::DateOutOfRange,
    }
}
