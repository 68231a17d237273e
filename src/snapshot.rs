/// Single-slot "latest value" cell between the detection thread and the render loop
///
/// This is the only synchronization between a graphic's producer and its
/// consumer. The slot stores a pointer to an immutable snapshot; publishing
/// swaps the pointer and loading clones it, so a reader holds either the old
/// snapshot or the new one in full. A plain `Mutex` is used rather than an
/// atomic pointer-swap cell. It guards the pointer alone and is never held
/// while a snapshot is read or drawn.
use std::sync::{Arc, Mutex, PoisonError};

use crate::detection::DetectionSnapshot;

#[derive(Debug, Clone, Default)]
pub enum SnapshotSlot {
    /// Nothing detected yet, or the face was lost upstream
    #[default]
    Absent,
    Present(Arc<DetectionSnapshot>),
}

impl SnapshotSlot {
    pub fn is_present(&self) -> bool {
        matches!(self, SnapshotSlot::Present(_))
    }
}

#[derive(Debug, Default)]
pub struct SnapshotCell {
    slot: Mutex<SnapshotSlot>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot, returning the previous slot
    pub fn publish(&self, snapshot: DetectionSnapshot) -> SnapshotSlot {
        self.swap(SnapshotSlot::Present(Arc::new(snapshot)))
    }

    /// Mark the face as lost
    pub fn clear(&self) -> SnapshotSlot {
        self.swap(SnapshotSlot::Absent)
    }

    pub fn load(&self) -> SnapshotSlot {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, next: SnapshotSlot) -> SnapshotSlot {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, next)
    }
}
