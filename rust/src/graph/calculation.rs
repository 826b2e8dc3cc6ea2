//! Critical path calculation using forward and backward passes.

use crate::interner::TaskIdx;
use crate::models::Time;

use super::task_graph::TaskGraph;
use super::types::{GraphError, TaskNode, TaskTiming};

impl TaskGraph {
    /// Compute EST/LFT for every task and return the critical path ids.
    ///
    /// Requires [`build_successors`](Self::build_successors). The path starts
    /// at the entry task heading the longest chain and follows zero-slack
    /// successors (`EST(succ) == EST(cur) + duration(cur)`) that continue that
    /// chain, so its total duration equals the precedence-only makespan.
    pub fn compute_critical_path(&mut self) -> Result<Vec<String>, GraphError> {
        let order = self.topological_order()?;
        let timings = forward_backward(&self.nodes, &order);
        let tails = chain_lengths(&self.nodes, &order);
        let path = trace_path(&self.nodes, &self.entries, &timings, &tails);

        for (node, timing) in self.nodes.iter_mut().zip(timings) {
            node.timing = Some(timing);
        }
        let ids = self.names_of(&path);
        self.critical_path = Some(path);
        Ok(ids)
    }

    /// Length of the longest precedence chain. Requires a computed critical path.
    pub fn critical_path_length(&self) -> Option<Time> {
        self.critical_path
            .as_ref()
            .map(|path| path.iter().map(|&t| self.duration(t)).sum())
    }
}

/// Forward pass for EST, then backward pass for LFT.
///
/// `order` must be a topological order covering every node.
fn forward_backward(nodes: &[TaskNode], order: &[TaskIdx]) -> Vec<TaskTiming> {
    let mut timings = vec![TaskTiming::default(); nodes.len()];

    for &task in order {
        let idx = task as usize;
        let earliest_start = nodes[idx]
            .predecessors
            .iter()
            .map(|&p| timings[p as usize].earliest_finish)
            .max()
            .unwrap_or(0);
        timings[idx].earliest_start = earliest_start;
        timings[idx].earliest_finish = earliest_start + nodes[idx].duration;
    }

    for &task in order.iter().rev() {
        let idx = task as usize;
        let latest_finish = nodes[idx]
            .successors
            .iter()
            .map(|&s| timings[s as usize].latest_start)
            .min()
            .unwrap_or(timings[idx].earliest_finish);
        timings[idx].latest_finish = latest_finish;
        timings[idx].latest_start = latest_finish.saturating_sub(nodes[idx].duration);
    }

    timings
}

/// Longest chain duration from each task (inclusive) to any terminal task.
fn chain_lengths(nodes: &[TaskNode], order: &[TaskIdx]) -> Vec<Time> {
    let mut tails = vec![0; nodes.len()];
    for &task in order.iter().rev() {
        let idx = task as usize;
        let downstream = nodes[idx]
            .successors
            .iter()
            .map(|&s| tails[s as usize])
            .max()
            .unwrap_or(0);
        tails[idx] = nodes[idx].duration + downstream;
    }
    tails
}

fn trace_path(
    nodes: &[TaskNode],
    entries: &[TaskIdx],
    timings: &[TaskTiming],
    tails: &[Time],
) -> Vec<TaskIdx> {
    // First entry with the longest chain wins ties.
    let mut start: Option<TaskIdx> = None;
    for &entry in entries {
        if start.map_or(true, |s| tails[entry as usize] > tails[s as usize]) {
            start = Some(entry);
        }
    }

    let mut path = Vec::new();
    let mut current = start;
    while let Some(task) = current {
        path.push(task);
        let idx = task as usize;
        let finish = timings[idx].earliest_finish;
        let remaining = tails[idx] - nodes[idx].duration;
        current = nodes[idx].successors.iter().copied().find(|&s| {
            timings[s as usize].earliest_start == finish && tails[s as usize] == remaining
        });
    }
    path
}
