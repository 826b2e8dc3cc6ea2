//! Task graph: registration, successor derivation and topological ordering.

use rustc_hash::FxHashSet;

use crate::interner::{TaskIdx, TaskInterner};
use crate::models::{Task, Time};

use super::types::{GraphError, TaskNode, TaskTiming};

/// Upper bound on the summed duration of all tasks.
///
/// Every start, finish and `g + h` value derived from a graph stays within
/// twice its total work, so this keeps all schedule arithmetic in range.
pub const MAX_TOTAL_WORK: Time = Time::MAX / 2;

/// DFS visitation state used by the topological sort.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Directed acyclic graph of tasks keyed by id.
///
/// Lifecycle: add every task, call [`build_successors`](Self::build_successors),
/// then [`compute_critical_path`](Self::compute_critical_path). Adding a task
/// afterwards discards successors, timings and the critical path, so derived
/// data can never be stale.
#[derive(Clone, Debug, Default)]
pub struct TaskGraph {
    pub(super) interner: TaskInterner,
    pub(super) nodes: Vec<TaskNode>,
    pub(super) entries: Vec<TaskIdx>,
    pub(super) successors_built: bool,
    pub(super) critical_path: Option<Vec<TaskIdx>>,
    pub(super) total_work: Time,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a task list, deriving successors.
    pub fn from_tasks<I>(tasks: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Task>,
    {
        let mut graph = Self::new();
        for task in tasks {
            graph.add_task(task)?;
        }
        graph.build_successors()?;
        Ok(graph)
    }

    /// Register a task. Fails with `DuplicateTaskId` if the id is taken and
    /// with `WorkOverflow` if total work would exceed [`MAX_TOTAL_WORK`].
    pub fn add_task(&mut self, task: Task) -> Result<TaskIdx, GraphError> {
        if self.interner.get(&task.id).is_some() {
            return Err(GraphError::DuplicateTaskId(task.id));
        }
        let total_work = self
            .total_work
            .checked_add(task.duration)
            .filter(|&total| total <= MAX_TOTAL_WORK)
            .ok_or_else(|| GraphError::WorkOverflow {
                task: task.id.clone(),
                limit: MAX_TOTAL_WORK,
            })?;

        let idx = self
            .interner
            .insert(&task.id)
            .map_err(|_| GraphError::DuplicateTaskId(task.id.clone()))?;

        let mut seen = FxHashSet::default();
        let predecessor_ids: Vec<String> = task
            .predecessors
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();

        if predecessor_ids.is_empty() {
            self.entries.push(idx);
        }
        self.nodes.push(TaskNode::new(task.duration, predecessor_ids));
        self.total_work = total_work;
        self.invalidate();
        Ok(idx)
    }

    fn invalidate(&mut self) {
        if !self.successors_built && self.critical_path.is_none() {
            return;
        }
        for node in &mut self.nodes {
            node.predecessors.clear();
            node.successors.clear();
            node.timing = None;
        }
        self.successors_built = false;
        self.critical_path = None;
    }

    /// Resolve predecessor ids and derive successor lists.
    ///
    /// Rebuilds from scratch, so calling it more than once is harmless.
    pub fn build_successors(&mut self) -> Result<(), GraphError> {
        let mut resolved: Vec<Vec<TaskIdx>> = Vec::with_capacity(self.nodes.len());
        for (idx, node) in self.nodes.iter().enumerate() {
            let preds = node
                .predecessor_ids
                .iter()
                .map(|p| {
                    self.interner
                        .get(p)
                        .ok_or_else(|| GraphError::UnknownPredecessor {
                            task: self.interner.names()[idx].clone(),
                            predecessor: p.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            resolved.push(preds);
        }

        for node in &mut self.nodes {
            node.successors.clear();
            node.timing = None;
        }
        for (idx, preds) in resolved.iter().enumerate() {
            for &pred in preds {
                self.nodes[pred as usize].successors.push(idx as TaskIdx);
            }
        }
        for (node, preds) in self.nodes.iter_mut().zip(resolved) {
            node.predecessors = preds;
        }

        self.successors_built = true;
        self.critical_path = None;
        Ok(())
    }

    /// Task ids in an order where every task follows all of its predecessors.
    pub fn topological_sort(&self) -> Result<Vec<String>, GraphError> {
        Ok(self.names_of(&self.topological_order()?))
    }

    /// Index form of [`topological_sort`](Self::topological_sort).
    ///
    /// Iterative DFS rooted at every entry task in insertion order; the
    /// reversed post-order is the result. A back edge, or a task no entry
    /// reaches, is reported as `CyclicDependency`.
    pub fn topological_order(&self) -> Result<Vec<TaskIdx>, GraphError> {
        if !self.successors_built {
            return Err(GraphError::SuccessorsNotBuilt);
        }

        let n = self.nodes.len();
        let mut marks = vec![Mark::Unvisited; n];
        let mut post_order: Vec<TaskIdx> = Vec::with_capacity(n);
        let mut stack: Vec<(TaskIdx, usize)> = Vec::new();

        for &root in &self.entries {
            if marks[root as usize] != Mark::Unvisited {
                continue;
            }
            marks[root as usize] = Mark::OnStack;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                match self.nodes[node as usize].successors.get(frame.1) {
                    Some(&succ) => {
                        frame.1 += 1;
                        match marks[succ as usize] {
                            Mark::Unvisited => {
                                marks[succ as usize] = Mark::OnStack;
                                stack.push((succ, 0));
                            }
                            Mark::OnStack => {
                                return Err(GraphError::CyclicDependency(
                                    self.name(succ).to_string(),
                                ));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[node as usize] = Mark::Done;
                        post_order.push(node);
                        stack.pop();
                    }
                }
            }
        }

        if let Some(stranded) = marks.iter().position(|&m| m != Mark::Done) {
            return Err(GraphError::CyclicDependency(
                self.name(stranded as TaskIdx).to_string(),
            ));
        }

        post_order.reverse();
        Ok(post_order)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn successors_built(&self) -> bool {
        self.successors_built
    }

    pub fn index_of(&self, id: &str) -> Option<TaskIdx> {
        self.interner.get(id)
    }

    /// Id of an interned task. Panics on an index not produced by this graph.
    pub fn name(&self, idx: TaskIdx) -> &str {
        &self.interner.names()[idx as usize]
    }

    pub fn names_of(&self, indices: &[TaskIdx]) -> Vec<String> {
        indices.iter().map(|&i| self.name(i).to_string()).collect()
    }

    pub fn duration(&self, idx: TaskIdx) -> Time {
        self.nodes[idx as usize].duration
    }

    pub fn predecessors(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.nodes[idx as usize].predecessors
    }

    pub fn successors(&self, idx: TaskIdx) -> &[TaskIdx] {
        &self.nodes[idx as usize].successors
    }

    /// Tasks without predecessors, in insertion order.
    pub fn entries(&self) -> &[TaskIdx] {
        &self.entries
    }

    /// Successor ids of a task, by id.
    pub fn successor_ids(&self, id: &str) -> Result<Vec<String>, GraphError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| GraphError::UnknownTask(id.to_string()))?;
        Ok(self.names_of(self.successors(idx)))
    }

    /// Timing for a task; `None` until the critical path has been computed.
    pub fn timing(&self, id: &str) -> Option<TaskTiming> {
        self.index_of(id)
            .and_then(|idx| self.nodes[idx as usize].timing)
    }

    /// Critical path indices from the last computation.
    pub fn critical_path_indices(&self) -> Option<&[TaskIdx]> {
        self.critical_path.as_deref()
    }

    /// Sum of all task durations.
    pub fn total_work(&self) -> Time {
        self.total_work
    }
}
