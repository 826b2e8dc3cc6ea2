//! Remaining-cost estimates for the A* search.
//!
//! The default estimate is the duration of critical path tasks not yet
//! placed. It ignores contention between processors, so on more than one
//! processor it can overestimate and the search is not guaranteed to return
//! a minimum-makespan schedule. `ZeroHeuristic` turns the search into a
//! uniform-cost search, which is exact but expands far more states.

use crate::config::{HEURISTIC_CRITICAL_PATH, HEURISTIC_ZERO};
use crate::graph::TaskGraph;
use crate::interner::TaskIdx;
use crate::models::Time;

use super::state::Slot;

/// Estimate of the cost still to come for a partial schedule.
///
/// `scheduled` is indexed by task; `None` marks an unplaced task. Any
/// `Fn(&TaskGraph, &[Option<Slot>]) -> Time` closure is a heuristic.
pub trait Heuristic {
    fn estimate(&self, graph: &TaskGraph, scheduled: &[Option<Slot>]) -> Time;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Heuristic for F
where
    F: Fn(&TaskGraph, &[Option<Slot>]) -> Time,
{
    fn estimate(&self, graph: &TaskGraph, scheduled: &[Option<Slot>]) -> Time {
        self(graph, scheduled)
    }
}

/// Sum of durations of unplaced critical path tasks.
#[derive(Clone, Debug, Default)]
pub struct CriticalPathRemaining {
    path: Vec<TaskIdx>,
}

impl CriticalPathRemaining {
    /// Uses the graph's computed critical path (empty if none was computed).
    pub fn new(graph: &TaskGraph) -> Self {
        Self {
            path: graph.critical_path_indices().unwrap_or_default().to_vec(),
        }
    }
}

impl Heuristic for CriticalPathRemaining {
    fn estimate(&self, graph: &TaskGraph, scheduled: &[Option<Slot>]) -> Time {
        self.path
            .iter()
            .filter(|&&t| scheduled[t as usize].is_none())
            .map(|&t| graph.duration(t))
            .sum()
    }

    fn name(&self) -> &str {
        HEURISTIC_CRITICAL_PATH
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _graph: &TaskGraph, _scheduled: &[Option<Slot>]) -> Time {
        0
    }

    fn name(&self) -> &str {
        HEURISTIC_ZERO
    }
}

/// Build the heuristic named in a configuration.
pub fn by_name(name: &str, graph: &TaskGraph) -> Option<Box<dyn Heuristic>> {
    match name {
        HEURISTIC_CRITICAL_PATH => Some(Box::new(CriticalPathRemaining::new(graph))),
        HEURISTIC_ZERO => Some(Box::new(ZeroHeuristic)),
        _ => None,
    }
}
