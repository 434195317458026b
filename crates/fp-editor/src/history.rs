//! Undo/Redo snapshot log.
//!
//! Every checkpoint is a full structural copy of the editor state taken
//! *before* a mutation. Undo swaps the live state with the newest checkpoint
//! and parks the live state on the redo stack; redo is the mirror image.
//! The undo stack is bounded: once full, the oldest checkpoint is evicted.

use std::collections::VecDeque;

/// Default number of checkpoints kept for undo.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Bounded undo/redo stacks of full-state snapshots.
#[derive(Debug, Clone)]
pub struct History<S> {
    undo_stack: VecDeque<S>,
    redo_stack: Vec<S>,
    /// Maximum undo depth.
    max_depth: usize,
}

impl<S: Clone> History<S> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_depth.min(DEFAULT_HISTORY_LIMIT)),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Push a deep copy of `current` as a checkpoint.
    pub fn snapshot(&mut self, current: &S) {
        self.record(current.clone());
    }

    /// Push an already-copied checkpoint. Clears redo: a new action
    /// invalidates forward history.
    pub fn record(&mut self, checkpoint: S) {
        self.undo_stack.push_back(checkpoint);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Restore the newest checkpoint into `current`.
    /// Returns `false` (and leaves `current` alone) when there is nothing to undo.
    pub fn undo(&mut self, current: &mut S) -> bool {
        let Some(checkpoint) = self.undo_stack.pop_back() else {
            return false;
        };
        let live = std::mem::replace(current, checkpoint);
        self.redo_stack.push(live);
        true
    }

    /// Re-apply the newest undone state into `current`.
    pub fn redo(&mut self, current: &mut S) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let live = std::mem::replace(current, next);
        self.undo_stack.push_back(live);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Oldest checkpoint still available for undo.
    pub fn oldest(&self) -> Option<&S> {
        self.undo_stack.front()
    }

    /// Drop all checkpoints in both directions.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<S: Clone> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
