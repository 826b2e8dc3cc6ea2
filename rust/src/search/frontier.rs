//! Priority queue of generated but unexpanded states.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::models::Time;

use super::state::ScheduleState;

/// Heap entry. Pops lowest total cost first, then the state with more tasks
/// placed, then the earliest pushed, so the order is fully deterministic.
struct Entry {
    total_cost: Time,
    depth: usize,
    seq: u64,
    state: Rc<ScheduleState>,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total_cost
            .cmp(&self.total_cost)
            .then_with(|| self.depth.cmp(&other.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    peak: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, state: Rc<ScheduleState>) {
        let entry = Entry {
            total_cost: state.total_cost(),
            depth: state.scheduled_count(),
            seq: self.next_seq,
            state,
        };
        self.next_seq += 1;
        self.heap.push(entry);
        self.peak = self.peak.max(self.heap.len());
    }

    pub fn pop(&mut self) -> Option<Rc<ScheduleState>> {
        self.heap.pop().map(|entry| entry.state)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Largest size reached so far.
    pub fn peak(&self) -> usize {
        self.peak
    }
}
