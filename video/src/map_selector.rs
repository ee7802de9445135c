//! Per-session "selected surface for next mmap" slot.
//!
//! Bridges the control channel (`MAP_SURFACE`) and the memory-mapping
//! interface: the device file has no byte-offset identity for a
//! surface since every session owns a disjoint id space, so the
//! session instead arms a single slot that the next mmap call
//! consumes.

/// Holds the `sid` armed by the most recent successful `MAP_SURFACE`
/// control operation, if any.
#[derive(Default)]
pub struct MapSelector {
    armed: Option<u32>,
}

impl MapSelector {
    pub fn new() -> Self {
        Self { armed: None }
    }

    /// Arm the slot with `sid`, replacing any previous selection.
    pub fn arm(&mut self, sid: u32) {
        self.armed = Some(sid);
    }

    /// Consume the armed selection, if any. A subsequent mmap call
    /// must re-arm via `MAP_SURFACE`; the slot is one-shot.
    pub fn take(&mut self) -> Option<u32> {
        self.armed.take()
    }

    /// Peek the armed selection without consuming it.
    pub fn peek(&self) -> Option<u32> {
        self.armed
    }

    /// Clear the slot if it currently names `sid` (called when `sid`
    /// is destroyed by the `SURFACE_DESTROY` handler).
    pub fn clear_if(&mut self, sid: u32) {
        if self.armed == Some(sid) {
            self.armed = None;
        }
    }
}
