//! Task id interning.
//!
//! Task ids are strings at the API boundary and dense `u32` indices
//! everywhere else. Indices are handed out in insertion order, which keeps
//! every index-ordered iteration deterministic.

use rustc_hash::FxHashMap;

/// Dense task index.
pub type TaskIdx = u32;

/// Bidirectional task id <-> index map that refuses duplicates.
#[derive(Debug, Clone, Default)]
pub struct TaskInterner {
    to_idx: FxHashMap<String, TaskIdx>,
    names: Vec<String>,
}

impl TaskInterner {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Register a new id.
    ///
    /// Returns `Err(existing)` without modifying the interner if the id is
    /// already known.
    pub fn insert(&mut self, id: &str) -> Result<TaskIdx, TaskIdx> {
        if let Some(&existing) = self.to_idx.get(id) {
            return Err(existing);
        }
        let idx = self.names.len() as TaskIdx;
        self.names.push(id.to_string());
        self.to_idx.insert(id.to_string(), idx);
        Ok(idx)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<TaskIdx> {
        self.to_idx.get(id).copied()
    }

    #[inline]
    pub fn resolve(&self, idx: TaskIdx) -> Option<&str> {
        self.names.get(idx as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All ids in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
