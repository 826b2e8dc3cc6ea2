//! A* search over partial schedules.
//!
//! Each state is an immutable partial schedule linked to the state it was
//! generated from. The engine expands the cheapest state by `g + h`, where
//! `g` is the makespan so far and `h` comes from a pluggable [`Heuristic`],
//! until every task is placed.

mod extraction;
mod frontier;
pub mod heuristic;
mod scheduler;
mod state;

pub use extraction::extract_timelines;
pub use heuristic::{CriticalPathRemaining, Heuristic, ZeroHeuristic};
pub use scheduler::{AStarScheduler, SchedulerError};
pub use state::{ScheduleState, Slot, StateKey};
