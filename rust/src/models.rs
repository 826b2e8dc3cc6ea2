//! Core data types exchanged with callers.

use pyo3::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Scheduling time unit. Durations, start and end times are all whole units.
pub type Time = u64;

/// A task to be scheduled: id, duration and the ids it must wait for.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub duration: Time,
    #[pyo3(get, set)]
    pub predecessors: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, duration: Time, predecessors: &[&str]) -> Self {
        Self {
            id: id.into(),
            duration,
            predecessors: predecessors.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (id, duration, predecessors=None))]
    fn py_new(id: String, duration: Time, predecessors: Option<Vec<String>>) -> Self {
        Self {
            id,
            duration,
            predecessors: predecessors.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, duration={}, predecessors={:?})",
            self.id, self.duration, self.predecessors
        )
    }
}

/// One task placed on a processor time slot.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledTask {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub start: Time,
    #[pyo3(get)]
    pub end: Time,
    #[pyo3(get)]
    pub processor: usize,
}

#[pymethods]
impl ScheduledTask {
    #[getter]
    pub fn duration(&self) -> Time {
        self.end - self.start
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(task_id={:?}, start={}, end={}, processor={})",
            self.task_id, self.start, self.end, self.processor
        )
    }
}

/// Counters collected while searching.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States popped and expanded.
    #[pyo3(get)]
    pub expansions: u64,
    /// Successor states pushed onto the frontier.
    #[pyo3(get)]
    pub generated: u64,
    /// Frontier entries dropped because an equal state was already expanded.
    #[pyo3(get)]
    pub duplicates_skipped: u64,
    /// Largest frontier size observed.
    #[pyo3(get)]
    pub frontier_peak: usize,
}

#[pymethods]
impl SearchStats {
    fn __repr__(&self) -> String {
        format!(
            "SearchStats(expansions={}, generated={}, duplicates_skipped={}, frontier_peak={})",
            self.expansions, self.generated, self.duplicates_skipped, self.frontier_peak
        )
    }
}

/// Result of a search: per-processor timelines plus summary data.
///
/// Only processors that received at least one task appear in `timelines`.
/// Each timeline is sorted by start time.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    #[pyo3(get)]
    pub timelines: BTreeMap<usize, Vec<ScheduledTask>>,
    #[pyo3(get)]
    pub makespan: Time,
    /// False when this is the best-so-far result of an aborted search.
    #[pyo3(get)]
    pub complete: bool,
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    #[pyo3(get)]
    pub stats: SearchStats,
}

impl Schedule {
    /// Every placed task, ordered by processor then start time.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.timelines.values().flatten()
    }

    pub fn get(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.entries().find(|e| e.task_id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.timelines.values().map(Vec::len).sum()
    }
}

#[pymethods]
impl Schedule {
    #[pyo3(name = "get")]
    fn py_get(&self, task_id: &str) -> Option<ScheduledTask> {
        self.get(task_id).cloned()
    }

    fn __len__(&self) -> usize {
        self.task_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "Schedule(makespan={}, tasks={}, processors_used={}, complete={})",
            self.makespan,
            self.task_count(),
            self.timelines.len(),
            self.complete
        )
    }

    fn __str__(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.complete { "Schedule" } else { "Partial schedule" };
        write!(f, "{} (Makespan: {})", label, self.makespan)?;
        for (proc, timeline) in &self.timelines {
            write!(f, "\n\nProcessor {}:", proc + 1)?;
            for entry in timeline {
                write!(
                    f,
                    "\n  Task {}: {:02}-{:02} (Duration: {})",
                    entry.task_id,
                    entry.start,
                    entry.end,
                    entry.duration()
                )?;
            }
        }
        Ok(())
    }
}
