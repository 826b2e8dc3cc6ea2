//! Rebuilding per-processor timelines from a final search state.

use std::collections::BTreeMap;

use crate::graph::TaskGraph;
use crate::interner::TaskIdx;
use crate::models::{ScheduledTask, Time};

use super::state::{ScheduleState, Slot};

/// Per-processor timelines and makespan of the schedule ending at `state`.
///
/// Walks the parent chain back to the root, keeping the first placement seen
/// for each task and the depth at which it was placed. Each timeline is
/// ordered by start, then end, then placement order, so a zero-duration task
/// precedes a successor starting at the same instant.
pub fn extract_timelines(
    graph: &TaskGraph,
    state: &ScheduleState,
) -> (BTreeMap<usize, Vec<ScheduledTask>>, Time) {
    let mut merged: Vec<Option<(Slot, usize)>> = vec![None; state.scheduled().len()];
    let mut cursor = Some(state);
    while let Some(current) = cursor {
        let depth = current.scheduled_count();
        for (task, slot) in current.scheduled().iter().enumerate() {
            let Some(slot) = slot else { continue };
            // Still present in an ancestor: placed no later than that ancestor.
            if let Some((_, placed_at)) = &mut merged[task] {
                *placed_at = depth;
            } else {
                merged[task] = Some((*slot, depth));
            }
        }
        cursor = current.parent().map(|p| p.as_ref());
    }

    let mut placed: Vec<(usize, TaskIdx, Slot)> = merged
        .into_iter()
        .enumerate()
        .filter_map(|(task, entry)| entry.map(|(slot, at)| (at, task as TaskIdx, slot)))
        .collect();
    placed.sort_by_key(|&(at, _, slot)| (slot.start, slot.end, at));

    let mut timelines: BTreeMap<usize, Vec<ScheduledTask>> = BTreeMap::new();
    let mut makespan = 0;
    for (_, task, slot) in placed {
        makespan = makespan.max(slot.end);
        timelines
            .entry(slot.processor)
            .or_default()
            .push(ScheduledTask {
                task_id: graph.name(task).to_string(),
                start: slot.start,
                end: slot.end,
                processor: slot.processor,
            });
    }

    (timelines, makespan)
}
