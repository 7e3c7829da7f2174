//! Pointer (fist) positions supplied by an external tracker.
//!
//! The engine only ever asks for the latest snapshot once per collision
//! check; how and when the tracker refreshes it is its own business.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline capacity for pointer snapshots; two hands is the common case.
pub const INLINE_POINTERS: usize = 4;

/// Per-frame pointer snapshot.
pub type PointerList = SmallVec<[PointerSample; INLINE_POINTERS]>;

/// One tracked pointer in play-area pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    /// Detector confidence in `[0, 1]`.
    pub confidence: f32,
}

impl PointerSample {
    /// A sample with full confidence.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            confidence: 1.0,
        }
    }

    pub fn with_confidence(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

/// Source of pointer positions.
pub trait PointerTracker: Send + Sync {
    /// Most recent positions of every active pointer.
    fn active_pointer_positions(&self) -> PointerList;
}

/// Tracker fed by the host loop (or a test) through [`SharedPointers::set`].
#[derive(Debug, Clone, Default)]
pub struct SharedPointers {
    inner: Arc<Mutex<PointerList>>,
}

impl SharedPointers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot.
    pub fn set(&self, pointers: impl IntoIterator<Item = PointerSample>) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        guard.extend(pointers);
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl PointerTracker for SharedPointers {
    fn active_pointer_positions(&self) -> PointerList {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Drop samples below `threshold` confidence.
pub fn confident(pointers: PointerList, threshold: f32) -> PointerList {
    pointers
        .into_iter()
        .filter(|p| p.confidence >= threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_pointers_replace_snapshot() {
        let pointers = SharedPointers::new();
        assert!(pointers.active_pointer_positions().is_empty());

        pointers.set([PointerSample::new(1.0, 2.0), PointerSample::new(3.0, 4.0)]);
        assert_eq!(pointers.active_pointer_positions().len(), 2);

        pointers.set([PointerSample::new(5.0, 6.0)]);
        let snap = pointers.active_pointer_positions();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].x, 5.0);

        pointers.clear();
        assert!(pointers.active_pointer_positions().is_empty());
    }

    #[test]
    fn test_confident_filters_low_samples() {
        let list: PointerList = [
            PointerSample::with_confidence(0.0, 0.0, 0.9),
            PointerSample::with_confidence(1.0, 1.0, 0.3),
            PointerSample::with_confidence(2.0, 2.0, 0.7),
        ]
        .into_iter()
        .collect();
        let kept = confident(list, 0.7);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].x, 2.0);
    }
}
