//! Task graph model.
//!
//! Tasks, durations and precedence edges, with successor derivation,
//! topological ordering and critical path analysis (forward pass for
//! earliest start times, backward pass for latest finish times).

mod calculation;
mod task_graph;
mod types;

pub use task_graph::{TaskGraph, MAX_TOTAL_WORK};
pub use types::{GraphError, TaskTiming};
