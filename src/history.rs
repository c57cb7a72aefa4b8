use crate::registry::Registry;

/// Maximum number of snapshots kept.
pub const HISTORY_CAPACITY: usize = 20;

/// Linear undo/redo over registry snapshots.
///
/// Snapshots are structural copies; the registry's persistent map shares
/// unchanged entries between them.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<Registry>,
    index: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a history whose only snapshot is `initial`.
    pub fn seeded(initial: &Registry) -> Self {
        let mut history = Self::new();
        history.record(initial);
        history
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Append a snapshot after the current position. Anything past the
    /// current position is dropped, and the oldest snapshots fall off once
    /// capacity is exceeded.
    pub fn record(&mut self, registry: &Registry) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(registry.clone());
        if self.snapshots.len() > HISTORY_CAPACITY {
            let excess = self.snapshots.len() - HISTORY_CAPACITY;
            self.snapshots.drain(..excess);
        }
        self.index = self.snapshots.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Step back one snapshot. `None` at the oldest snapshot.
    pub fn undo(&mut self) -> Option<Registry> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index).cloned()
    }

    /// Step forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<Registry> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index).cloned()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.index = 0;
    }
}
