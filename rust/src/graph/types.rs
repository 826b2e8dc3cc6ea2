//! Types for the task graph model.

use pyo3::prelude::*;
use thiserror::Error;

use crate::interner::TaskIdx;
use crate::models::Time;

/// Errors raised while building or analysing a task graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),
    #[error("Task {task:?} lists unknown predecessor {predecessor:?}")]
    UnknownPredecessor { task: String, predecessor: String },
    #[error("Circular dependency detected involving task {0:?}")]
    CyclicDependency(String),
    #[error("Successor lists are not built; call build_successors() first")]
    SuccessorsNotBuilt,
    #[error("Unknown task: {0}")]
    UnknownTask(String),
    #[error("Task {task:?} pushes total work past the limit of {limit} time units")]
    WorkOverflow { task: String, limit: Time },
}

/// Precedence-only timing of a task (processor contention ignored).
#[pyclass]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest start time (forward pass).
    #[pyo3(get)]
    pub earliest_start: Time,
    /// Earliest finish time = earliest_start + duration.
    #[pyo3(get)]
    pub earliest_finish: Time,
    /// Latest start time = latest_finish - duration.
    #[pyo3(get)]
    pub latest_start: Time,
    /// Latest finish time (backward pass). Terminal tasks finish as early as possible.
    #[pyo3(get)]
    pub latest_finish: Time,
}

impl TaskTiming {
    pub fn slack(&self) -> Time {
        self.latest_start - self.earliest_start
    }
}

#[pymethods]
impl TaskTiming {
    #[pyo3(name = "slack")]
    fn py_slack(&self) -> Time {
        self.slack()
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskTiming(est={}, eft={}, lst={}, lft={})",
            self.earliest_start, self.earliest_finish, self.latest_start, self.latest_finish
        )
    }
}

/// A task as stored inside [`TaskGraph`](super::TaskGraph).
#[derive(Clone, Debug)]
pub(crate) struct TaskNode {
    pub duration: Time,
    /// Predecessor ids as given, duplicates removed.
    pub predecessor_ids: Vec<String>,
    /// Resolved predecessors (valid once successors are built).
    pub predecessors: Vec<TaskIdx>,
    /// Derived successors (valid once successors are built).
    pub successors: Vec<TaskIdx>,
    /// Filled by the critical path computation.
    pub timing: Option<TaskTiming>,
}

impl TaskNode {
    pub fn new(duration: Time, predecessor_ids: Vec<String>) -> Self {
        Self {
            duration,
            predecessor_ids,
            predecessors: Vec::new(),
            successors: Vec::new(),
            timing: None,
        }
    }
}
