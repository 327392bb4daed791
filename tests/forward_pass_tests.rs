use chrono::NaiveDate;
use gantt_engine::error::{ConstraintViolation, ScheduleError};
use gantt_engine::{
    Dependency, DependencyType, ProjectGraph, ProjectSchedule, SchedulePin, Task, WorkCalendar,
    compute_schedule,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn schedule(tasks: Vec<Task>, deps: Vec<Dependency>) -> ProjectSchedule {
    let graph = ProjectGraph::build(1, tasks, deps).unwrap();
    compute_schedule(&graph, d(2025, 1, 6), &WorkCalendar::default(), true).unwrap()
}

fn dates(schedule: &ProjectSchedule, id: i64) -> (NaiveDate, NaiveDate) {
    let r = schedule.result(id).unwrap();
    (r.computed_start, r.computed_end)
}

#[test]
fn finish_to_start_begins_the_day_after_predecessor_ends() {
    let s = schedule(
        vec![Task::new(1, 1, "Foundation", 5), Task::new(2, 1, "Framing", 3)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FS)],
    );
    // Task 1 covers day 0..=4, so task 2 starts five days after the project start.
    assert_eq!(dates(&s, 1), (d(2025, 1, 6), d(2025, 1, 10)));
    assert_eq!(dates(&s, 2), (d(2025, 1, 11), d(2025, 1, 13)));
}

#[test]
fn finish_to_start_lag_adds_days() {
    let s = schedule(
        vec![Task::new(1, 1, "Pour", 2), Task::new(2, 1, "Strip forms", 1)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FS).with_lag(3)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 11), d(2025, 1, 11)));
}

#[test]
fn start_to_start_offsets_from_predecessor_start() {
    let s = schedule(
        vec![Task::new(1, 1, "Excavate", 5), Task::new(2, 1, "Shore", 2)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::SS).with_lag(2)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 8), d(2025, 1, 9)));
}

#[test]
fn finish_to_finish_aligns_ends() {
    let s = schedule(
        vec![Task::new(1, 1, "Wiring", 5), Task::new(2, 1, "Inspection", 3)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FF)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 8), d(2025, 1, 10)));
}

#[test]
fn start_to_finish_ends_relative_to_predecessor_start() {
    let s = schedule(
        vec![Task::new(1, 1, "Cutover", 5), Task::new(2, 1, "Legacy run", 3)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::SF).with_lag(4)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 8), d(2025, 1, 10)));
}

#[test]
fn latest_incoming_constraint_wins() {
    let s = schedule(
        vec![
            Task::new(1, 1, "Short", 1),
            Task::new(2, 1, "Long", 4),
            Task::new(3, 1, "Join", 1),
        ],
        vec![
            Dependency::new(1, 1, 1, 3, DependencyType::FS),
            Dependency::new(2, 1, 2, 3, DependencyType::FS),
        ],
    );
    assert_eq!(dates(&s, 3), (d(2025, 1, 10), d(2025, 1, 10)));
}

#[test]
fn negative_lag_overlaps_when_allowed() {
    let s = schedule(
        vec![Task::new(1, 1, "Design", 5), Task::new(2, 1, "Prototype", 2)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FS).with_lag(-2)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 9), d(2025, 1, 10)));
}

#[test]
fn negative_lag_rejected_when_disabled() {
    let graph = ProjectGraph::build(
        1,
        vec![Task::new(1, 1, "Design", 5), Task::new(2, 1, "Prototype", 2)],
        vec![Dependency::new(7, 1, 1, 2, DependencyType::FS).with_lag(-2)],
    )
    .unwrap();
    let err = compute_schedule(&graph, d(2025, 1, 6), &WorkCalendar::default(), false).unwrap_err();
    match err {
        ScheduleError::InvalidScheduleConstraint {
            task_id,
            dependency_id,
            reason,
        } => {
            assert_eq!(task_id, 2);
            assert_eq!(dependency_id, Some(7));
            assert_eq!(reason, ConstraintViolation::LeadNotAllowed(-2));
        }
        other => panic!("expected constraint error, got {other:?}"),
    }
}

#[test]
fn milestone_starts_and_ends_same_day() {
    let s = schedule(
        vec![Task::new(1, 1, "Build", 3), Task::milestone(2, 1, "Handover")],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FS)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 9), d(2025, 1, 9)));
}

#[test]
fn source_task_uses_planned_start() {
    let mut late = Task::new(2, 1, "Procurement", 2);
    late.planned_start = Some(d(2025, 1, 9));
    let s = schedule(vec![Task::new(1, 1, "Kickoff", 1), late], Vec::new());
    assert_eq!(dates(&s, 1), (d(2025, 1, 6), d(2025, 1, 6)));
    assert_eq!(dates(&s, 2), (d(2025, 1, 9), d(2025, 1, 10)));
}

#[test]
fn pinned_start_overrides_dependencies() {
    let mut pinned = Task::new(2, 1, "Delivery", 2);
    pinned.pin = SchedulePin::start(d(2025, 1, 7));
    let s = schedule(
        vec![Task::new(1, 1, "Order", 5), pinned],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FS)],
    );
    assert_eq!(dates(&s, 2), (d(2025, 1, 7), d(2025, 1, 8)));
}

#[test]
fn pinned_end_derives_start_from_duration() {
    let mut pinned = Task::new(1, 1, "Audit", 3);
    pinned.pin = SchedulePin::end(d(2025, 1, 15));
    let s = schedule(vec![pinned], Vec::new());
    assert_eq!(dates(&s, 1), (d(2025, 1, 13), d(2025, 1, 15)));
}

#[test]
fn pins_with_end_before_start_are_rejected() {
    let mut task = Task::new(1, 1, "Broken", 2);
    task.pin = SchedulePin {
        start: Some(d(2025, 1, 10)),
        end: Some(d(2025, 1, 8)),
    };
    let graph = ProjectGraph::build(1, vec![task], Vec::new()).unwrap();
    let err = compute_schedule(&graph, d(2025, 1, 6), &WorkCalendar::default(), true).unwrap_err();
    assert!(matches!(
        err,
        ScheduleError::InvalidScheduleConstraint {
            task_id: 1,
            reason: ConstraintViolation::EndBeforeStart { .. },
            ..
        }
    ));
}

#[test]
fn cyclic_data_is_reported_instead_of_scheduled() {
    let graph = ProjectGraph::build(
        1,
        vec![
            Task::new(1, 1, "A", 1),
            Task::new(2, 1, "B", 1),
            Task::new(3, 1, "C", 1),
            Task::new(4, 1, "Outside", 1),
        ],
        vec![
            Dependency::new(1, 1, 1, 2, DependencyType::FS),
            Dependency::new(2, 1, 2, 3, DependencyType::FS),
            Dependency::new(3, 1, 3, 1, DependencyType::FS),
        ],
    )
    .unwrap();
    let err = compute_schedule(&graph, d(2025, 1, 6), &WorkCalendar::default(), true).unwrap_err();
    match err {
        ScheduleError::CyclicSchedule { task_ids } => assert_eq!(task_ids, vec![1, 2, 3]),
        other => panic!("expected cyclic schedule, got {other:?}"),
    }
}

#[test]
fn working_week_skips_weekends() {
    let graph = ProjectGraph::build(
        1,
        vec![Task::new(1, 1, "Form", 3), Task::new(2, 1, "Pour", 1)],
        vec![Dependency::new(1, 1, 1, 2, DependencyType::FS)],
    )
    .unwrap();
    // Saturday start rolls forward to Monday.
    let s = compute_schedule(&graph, d(2025, 1, 11), &WorkCalendar::five_day_week(), true).unwrap();
    assert_eq!(dates(&s, 1), (d(2025, 1, 13), d(2025, 1, 15)));
    assert_eq!(dates(&s, 2), (d(2025, 1, 16), d(2025, 1, 16)));

    // Friday start spans the weekend.
    let s = compute_schedule(&graph, d(2025, 1, 10), &WorkCalendar::five_day_week(), true).unwrap();
    assert_eq!(dates(&s, 1), (d(2025, 1, 10), d(2025, 1, 14)));
    assert_eq!(dates(&s, 2), (d(2025, 1, 15), d(2025, 1, 15)));
}

#[test]
fn every_dependency_is_satisfied_by_unpinned_successors() {
    let tasks = vec![
        Task::new(1, 1, "A", 3),
        Task::new(2, 1, "B", 2),
        Task::new(3, 1, "C", 4),
        Task::new(4, 1, "D", 1),
        Task::milestone(5, 1, "E"),
    ];
    let deps = vec![
        Dependency::new(1, 1, 1, 2, DependencyType::FS).with_lag(1),
        Dependency::new(2, 1, 1, 3, DependencyType::SS).with_lag(1),
        Dependency::new(3, 1, 2, 4, DependencyType::FF),
        Dependency::new(4, 1, 3, 4, DependencyType::SF).with_lag(2),
        Dependency::new(5, 1, 4, 5, DependencyType::FS),
    ];
    let s = schedule(tasks, deps.clone());
    let one_day = chrono::Duration::days(1);
    for dep in &deps {
        let (ps, pf) = dates(&s, dep.predecessor_task_id);
        let (ss, sf) = dates(&s, dep.successor_task_id);
        let lag = chrono::Duration::days(dep.lag_days);
        match dep.dependency_type {
            DependencyType::FS => assert!(ss >= pf + lag + one_day),
            DependencyType::SS => assert!(ss >= ps + lag),
            DependencyType::FF => assert!(sf >= pf + lag),
            DependencyType::SF => assert!(sf >= ps + lag),
        }
    }
}

fn assert_out_of_range(err: ScheduleError, task: i64, dependency: Option<i64>) {
    match err {
        ScheduleError::InvalidScheduleConstraint {
            task_id,
            dependency_id,
            reason: ConstraintViolation::DateOutOfRange,
        } => {
            assert_eq!(task_id, task);
            assert_eq!(dependency_id, dependency);
        }
        other => panic!("expected out-of-range constraint, got {other:?}"),
    }
}

fn schedule_err(tasks: Vec<Task>, deps: Vec<Dependency>, start: NaiveDate) -> ScheduleError {
    let graph = ProjectGraph::build(1, tasks, deps).unwrap();
    compute_schedule(&graph, start, &WorkCalendar::default(), true).unwrap_err()
}

#[test]
fn extreme_positive_lag_is_out_of_range() {
    let err = schedule_err(
        vec![Task::new(1, 1, "A", 2), Task::new(2, 1, "B", 1)],
        vec![Dependency::new(3, 1, 1, 2, DependencyType::FS).with_lag(i64::MAX)],
        d(2025, 1, 6),
    );
    assert_out_of_range(err, 2, Some(3));
}

#[test]
fn extreme_negative_lag_is_out_of_range() {
    let err = schedule_err(
        vec![Task::new(1, 1, "A", 2), Task::new(2, 1, "B", 3)],
        vec![Dependency::new(4, 1, 1, 2, DependencyType::SF).with_lag(i64::MIN)],
        d(2025, 1, 6),
    );
    assert_out_of_range(err, 2, Some(4));
}

#[test]
fn extreme_lag_on_working_week_is_out_of_range() {
    let graph = ProjectGraph::build(
        1,
        vec![Task::new(1, 1, "A", 2), Task::new(2, 1, "B", 1)],
        vec![Dependency::new(5, 1, 1, 2, DependencyType::SS).with_lag(i64::MAX)],
    )
    .unwrap();
    let err =
        compute_schedule(&graph, d(2025, 1, 6), &WorkCalendar::five_day_week(), true).unwrap_err();
    assert_out_of_range(err, 2, Some(5));
}

#[test]
fn successor_past_the_last_date_is_out_of_range() {
    let err = schedule_err(
        vec![Task::new(1, 1, "A", 1), Task::new(2, 1, "B", 1)],
        vec![Dependency::new(6, 1, 1, 2, DependencyType::FS).with_lag(10)],
        NaiveDate::MAX,
    );
    assert_out_of_range(err, 2, Some(6));
}

#[test]
fn end_pin_at_first_date_is_out_of_range() {
    let mut pinned = Task::new(1, 1, "Ancient", 3);
    pinned.pin = SchedulePin::end(NaiveDate::MIN);
    let err = schedule_err(vec![pinned], Vec::new(), d(2025, 1, 6));
    assert_out_of_range(err, 1, None);
}

