//! Fixtures and checks shared by the unit tests.

use rustc_hash::FxHashMap;

use crate::models::{Schedule, ScheduledTask, Task};

/// Ten-task graph used throughout the tests. Critical path
/// t1 -> t3 -> t5 -> t6 -> t8 -> t10, length 26; total work 37.
pub fn reference_tasks() -> Vec<Task> {
    vec![
        Task::new("t1", 5, &[]),
        Task::new("t2", 3, &["t1"]),
        Task::new("t3", 4, &["t1"]),
        Task::new("t4", 2, &["t2"]),
        Task::new("t5", 6, &["t3"]),
        Task::new("t6", 3, &["t4", "t5"]),
        Task::new("t7", 4, &["t5"]),
        Task::new("t8", 5, &["t6"]),
        Task::new("t9", 2, &["t7"]),
        Task::new("t10", 3, &["t8", "t9"]),
    ]
}

/// Deterministic pseudo-random DAG: task `gi` may depend on any `gj`, `j < i`.
pub fn generated_dag(seed: u64, size: usize) -> Vec<Task> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    };
    (0..size)
        .map(|i| {
            let predecessors: Vec<String> = (0..i)
                .filter(|_| next() % 3 == 0)
                .map(|p| format!("g{}", p))
                .collect();
            Task {
                id: format!("g{}", i),
                duration: 1 + next() % 5,
                predecessors,
            }
        })
        .collect()
}

/// Check completeness, durations, precedence, non-overlap and makespan.
pub fn assert_valid_schedule(schedule: &Schedule, tasks: &[Task], num_processors: usize) {
    assert!(schedule.complete, "schedule is partial");
    assert_eq!(schedule.task_count(), tasks.len(), "not every task placed");

    let placed: FxHashMap<&str, &ScheduledTask> = schedule
        .entries()
        .map(|e| (e.task_id.as_str(), e))
        .collect();
    assert_eq!(placed.len(), tasks.len(), "a task was placed twice");

    for task in tasks {
        let entry = placed[task.id.as_str()];
        assert_eq!(entry.end - entry.start, task.duration, "{} duration", task.id);
        assert!(entry.processor < num_processors, "{} processor", task.id);
        for pred in &task.predecessors {
            let before = placed[pred.as_str()];
            assert!(
                before.end <= entry.start,
                "{} starts at {} before {} ends at {}",
                task.id,
                entry.start,
                pred,
                before.end
            );
        }
    }

    for (processor, timeline) in &schedule.timelines {
        assert!(timeline.iter().all(|e| e.processor == *processor));
        for pair in timeline.windows(2) {
            assert!(
                pair[0].end <= pair[1].start,
                "{} and {} overlap on processor {}",
                pair[0].task_id,
                pair[1].task_id,
                processor
            );
        }
    }

    let latest = schedule.entries().map(|e| e.end).max().unwrap_or(0);
    assert_eq!(schedule.makespan, latest);
}
