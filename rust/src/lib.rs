//! A* multi-processor task scheduler.
//!
//! Builds a precedence graph of tasks, derives its critical path with
//! forward/backward timing passes, and searches the space of partial
//! schedules with A* to assign every task to a processor time slot while
//! keeping the makespan low. Exposed to Python as the `astar_sched` module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;

mod config;
pub mod graph;
pub mod interner;
pub mod logging;
mod models;
pub mod search;

#[cfg(test)]
mod test_support;

pub use config::{SearchConfig, HEURISTIC_CRITICAL_PATH, HEURISTIC_ZERO, VALID_HEURISTICS};
pub use graph::{GraphError, TaskGraph, TaskTiming, MAX_TOTAL_WORK};
pub use models::{Schedule, ScheduledTask, SearchStats, Task, Time};
pub use search::{AStarScheduler, Heuristic, ScheduleState, SchedulerError, Slot};

fn to_py_err(err: SchedulerError) -> PyErr {
    match &err {
        SchedulerError::Graph(_) | SchedulerError::InvalidConfig(_) => {
            PyValueError::new_err(err.to_string())
        }
        SchedulerError::NoScheduleFound | SchedulerError::SearchBudgetExceeded { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

fn graph_from(tasks: Vec<Task>) -> PyResult<TaskGraph> {
    TaskGraph::from_tasks(tasks).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Schedule tasks on `num_processors` identical processors with A*.
///
/// # Arguments
/// * `tasks` - Tasks with durations and predecessor ids
/// * `num_processors` - Number of processors (overrides `config.num_processors`)
/// * `config` - Heuristic, budgets and verbosity; defaults when omitted
///
/// # Returns
/// * Schedule with per-processor timelines and the makespan
///
/// # Raises
/// * ValueError on duplicate ids, unknown predecessors, cycles or bad config
/// * RuntimeError if no schedule is found or a search budget runs out
#[pyfunction]
#[pyo3(signature = (tasks, num_processors, config=None))]
fn schedule_tasks(
    tasks: Vec<Task>,
    num_processors: usize,
    config: Option<SearchConfig>,
) -> PyResult<Schedule> {
    let config = SearchConfig {
        num_processors,
        ..config.unwrap_or_default()
    };
    let scheduler = AStarScheduler::new(graph_from(tasks)?, config).map_err(to_py_err)?;
    scheduler.schedule().map_err(to_py_err)
}

/// Critical path task ids, entry first.
///
/// # Raises
/// * ValueError on duplicate ids, unknown predecessors or cycles
#[pyfunction]
fn critical_path(tasks: Vec<Task>) -> PyResult<Vec<String>> {
    let mut graph = graph_from(tasks)?;
    graph
        .compute_critical_path()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Task ids ordered so every task follows its predecessors.
#[pyfunction]
fn topological_order(tasks: Vec<Task>) -> PyResult<Vec<String>> {
    graph_from(tasks)?
        .topological_sort()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Precedence-only timing (EST/EFT/LST/LFT) for every task.
#[pyfunction]
fn task_timings(tasks: Vec<Task>) -> PyResult<HashMap<String, TaskTiming>> {
    let ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
    let mut graph = graph_from(tasks)?;
    graph
        .compute_critical_path()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(ids
        .into_iter()
        .filter_map(|id| graph.timing(&id).map(|timing| (id, timing)))
        .collect())
}

/// The astar_sched Python module.
#[pymodule]
fn astar_sched(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<Task>()?;
    m.add_class::<ScheduledTask>()?;
    m.add_class::<Schedule>()?;
    m.add_class::<SearchStats>()?;
    m.add_class::<TaskTiming>()?;

    // Config types
    m.add_class::<SearchConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(schedule_tasks, m)?)?;
    m.add_function(wrap_pyfunction!(critical_path, m)?)?;
    m.add_function(wrap_pyfunction!(topological_order, m)?)?;
    m.add_function(wrap_pyfunction!(task_timings, m)?)?;

    Ok(())
}
