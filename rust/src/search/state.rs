//! Immutable search states (partial schedules).

use std::rc::Rc;

use crate::interner::TaskIdx;
use crate::models::Time;

/// Placement of one task: `[start, end)` on `processor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub start: Time,
    pub end: Time,
    pub processor: usize,
}

/// Deduplication key: the placement of every task, indexed by task.
///
/// Index order is fixed by the graph, so two states that placed the same
/// tasks identically produce equal keys regardless of assignment order.
pub type StateKey = Rc<[Option<Slot>]>;

/// One node of the search space.
///
/// Never mutated after construction; successors copy and extend.
#[derive(Debug)]
pub struct ScheduleState {
    scheduled: StateKey,
    scheduled_count: usize,
    proc_times: Box<[Time]>,
    makespan: Time,
    heuristic: Time,
    parent: Option<Rc<ScheduleState>>,
}

impl ScheduleState {
    /// The empty schedule.
    pub fn root(num_tasks: usize, num_processors: usize, heuristic: Time) -> Self {
        Self {
            scheduled: vec![None; num_tasks].into(),
            scheduled_count: 0,
            proc_times: vec![0; num_processors].into_boxed_slice(),
            makespan: 0,
            heuristic,
            parent: None,
        }
    }

    /// Copy `parent`, place `task` in `slot`, and estimate the result with
    /// `estimate`.
    pub fn successor<F>(parent: &Rc<Self>, task: TaskIdx, slot: Slot, estimate: F) -> Self
    where
        F: FnOnce(&[Option<Slot>]) -> Time,
    {
        let mut scheduled = parent.scheduled.to_vec();
        debug_assert!(scheduled[task as usize].is_none());
        scheduled[task as usize] = Some(slot);

        let mut proc_times = parent.proc_times.clone();
        proc_times[slot.processor] = slot.end;

        let heuristic = estimate(&scheduled);
        Self {
            scheduled: scheduled.into(),
            scheduled_count: parent.scheduled_count + 1,
            proc_times,
            makespan: parent.makespan.max(slot.end),
            heuristic,
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn scheduled(&self) -> &[Option<Slot>] {
        &self.scheduled
    }

    pub fn slot(&self, task: TaskIdx) -> Option<Slot> {
        self.scheduled[task as usize]
    }

    pub fn is_scheduled(&self, task: TaskIdx) -> bool {
        self.scheduled[task as usize].is_some()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled_count
    }

    pub fn is_complete(&self) -> bool {
        self.scheduled_count == self.scheduled.len()
    }

    /// Next free time of each processor.
    pub fn proc_times(&self) -> &[Time] {
        &self.proc_times
    }

    /// Cost so far (`g`).
    pub fn makespan(&self) -> Time {
        self.makespan
    }

    /// Estimated remaining cost (`h`).
    pub fn heuristic(&self) -> Time {
        self.heuristic
    }

    /// `g + h`, the frontier priority.
    pub fn total_cost(&self) -> Time {
        self.makespan.saturating_add(self.heuristic)
    }

    pub fn parent(&self) -> Option<&Rc<ScheduleState>> {
        self.parent.as_ref()
    }

    pub fn key(&self) -> StateKey {
        Rc::clone(&self.scheduled)
    }
}
