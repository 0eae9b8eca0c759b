//! Snapshot-based undo/redo.
//!
//! The history is a bounded list of full document snapshots plus a cursor.
//! The cursor always points at a valid snapshot once the history has been
//! seeded, and committing truncates anything after it.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

/// Bounded undo/redo stack of owned snapshots.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    index: usize,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Start a history whose base state is `initial`. Capacity is floored at 1.
    #[must_use]
    pub fn new(initial: T, capacity: usize) -> Self {
        Self { snapshots: vec![initial], index: 0, capacity: capacity.max(1) }
    }

    /// Record a new state after the current one, dropping any redo tail.
    /// The oldest snapshot is evicted once capacity is exceeded.
    pub fn commit(&mut self, state: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(state);
        if self.snapshots.len() > self.capacity {
            let excess = self.snapshots.len() - self.capacity;
            self.snapshots.drain(..excess);
        }
        self.index = self.snapshots.len() - 1;
    }

    /// Step back and return a copy of the now-current snapshot.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index).cloned()
    }

    /// Step forward and return a copy of the now-current snapshot.
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index).cloned()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Discard everything and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
    }

    /// The snapshot the cursor points at.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
