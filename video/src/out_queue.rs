//! Bounded FIFO of outbound frames for one session.
//!
//! Generalizes `EventQueue` (`video/src/compositor/queue.rs`) from a
//! count-bounded queue of compositor events to a count-*and*-
//! byte-bounded queue of already-serialized frame bytes, and adds the
//! condition variable a blocking reader needs.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Default outbound queue depth limit.
pub const DEFAULT_MAX_OUTQ_DEPTH: usize = 256;
/// Default outbound queue aggregate byte limit.
pub const DEFAULT_MAX_OUTQ_BYTES: usize = 256 * 1024;

struct Inner {
    frames: VecDeque<Vec<u8>>,
    bytes: usize,
    closed: bool,
}

/// FIFO of fully-formed outbound frames (replies and events share one
/// queue; ordering is strict). One condition variable wakes blocked
/// readers on enqueue or on session teardown.
pub struct OutQueue {
    inner: Mutex<Inner>,
    not_empty: Condvar,
    max_depth: usize,
    max_bytes: usize,
}

/// Why `enqueue` failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// Either the depth or the byte bound would be exceeded.
    Full,
}

impl OutQueue {
    pub fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                frames: VecDeque::new(),
                bytes: 0,
                closed: false,
            }),
            not_empty: Condvar::new(),
            max_depth,
            max_bytes,
        }
    }

    /// Push `frame` onto the tail. Fails without mutating state if
    /// either bound would be exceeded. Wakes one blocked reader on
    /// success.
    pub fn enqueue(&self, frame: Vec<u8>) -> Result<(), EnqueueError> {
        let mut guard = self.inner.lock().unwrap();
        if guard.frames.len() >= self.max_depth || guard.bytes + frame.len() > self.max_bytes {
            log::debug!(
                "drawfs: outqueue full (depth={} bytes={})",
                guard.frames.len(),
                guard.bytes
            );
            return Err(EnqueueError::Full);
        }
        guard.bytes += frame.len();
        guard.frames.push_back(frame);
        drop(guard);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Pop the head frame without blocking. `None` if empty.
    pub fn try_dequeue(&self) -> Option<Vec<u8>> {
        let mut guard = self.inner.lock().unwrap();
        let frame = guard.frames.pop_front()?;
        guard.bytes -= frame.len();
        Some(frame)
    }

    /// Pop the head frame, blocking until one is available or the
    /// session is closed. `None` means closed-and-empty (end of file).
    pub fn dequeue_blocking(&self) -> Option<Vec<u8>> {
        let mut guard = self.inner.lock().unwrap();
        loop {
            if let Some(frame) = guard.frames.pop_front() {
                guard.bytes -= frame.len();
                return Some(frame);
            }
            if guard.closed {
                return None;
            }
            guard = self.not_empty.wait(guard).unwrap();
        }
    }

    /// Wake every blocked reader with end-of-file; further blocking
    /// dequeues return `None` immediately once the queue drains.
    pub fn close(&self) {
        let mut guard = self.inner.lock().unwrap();
        guard.closed = true;
        drop(guard);
        self.not_empty.notify_all();
    }

    /// Number of queued frames.
    pub fn depth(&self) -> usize {
        self.inner.lock().unwrap().frames.len()
    }

    /// Aggregate bytes queued.
    pub fn bytes(&self) -> usize {
        self.inner.lock().unwrap().bytes
    }

    /// Readiness for the poll interface: readable iff non-empty.
    pub fn is_readable(&self) -> bool {
        !self.inner.lock().unwrap().frames.is_empty()
    }
}

impl Default for OutQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OUTQ_DEPTH, DEFAULT_MAX_OUTQ_BYTES)
    }
}
