//! `Device`/`Handle`: the entry points a client thread actually
//! calls. Follows the same table-of-open-handles shape as a
//! conventional fd table (`FileTableSlot`/`with_tables`) — here
//! generalized from a fixed-size per-process array to an unbounded
//! map of live sessions, since a DrawFS device has no analogous
//! per-process fd cap.
//!
//! Each `Handle` resolves its own session directly (it holds an
//! `Arc<Session>` from open time) rather than walking a global table
//! on every call.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use drawfs_abi::error::Errno;
use drawfs_abi::stats::Stats;
use drawfs_core::Session;
use drawfs_lib::DeviceConfig;
use drawfs_mm::SurfaceMemory;
use drawfs_video::Registry;

/// Control operations issued out-of-band from the frame stream.
pub enum ControlOp {
    /// Arm the mmap selector for `sid`, returning `(sid, stride, total)`.
    MapSurface(u32),
    /// Snapshot this session's counters.
    Stats,
}

struct DeviceState {
    registry: Registry,
    config: DeviceConfig,
    sessions: Mutex<std::collections::HashMap<u32, Arc<Session>>>,
    next_id: AtomicU32,
}

/// The character device node. One process-wide instance; every
/// `open()` creates an independent `Session`.
#[derive(Clone)]
pub struct Device {
    state: Arc<DeviceState>,
}

impl Device {
    /// Build a device whose display list and session capacity limits
    /// come from `config`.
    pub fn new(config: DeviceConfig) -> Self {
        let registry = Registry::new(config.displays.clone());
        Self {
            state: Arc::new(DeviceState {
                registry,
                config,
                sessions: Mutex::new(std::collections::HashMap::new()),
                next_id: AtomicU32::new(1),
            }),
        }
    }

    /// Open a fresh, independent session.
    pub fn open(&self) -> Handle {
        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(Session::with_config(
            self.state.registry.clone(),
            &self.state.config,
        ));
        self.state
            .sessions
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&session));
        log::debug!("drawfs: session {id} opened");
        Handle {
            id,
            session,
            device: Arc::clone(&self.state),
        }
    }

    /// Number of sessions currently open. Exposed for tests and
    /// diagnostics, not part of the wire protocol.
    pub fn open_session_count(&self) -> usize {
        self.state.sessions.lock().unwrap().len()
    }
}

/// One open file description. Dropping (or explicitly `close`-ing) a
/// `Handle` tears down its session: drains the outqueue, wakes
/// blocked readers with end-of-file, and frees every surface's
/// pixel-memory reference held by the table.
pub struct Handle {
    id: u32,
    session: Arc<Session>,
    device: Arc<DeviceState>,
}

impl Handle {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Accept `data` whole or fail with `ENOSPC`/`EMSGSIZE`; never blocks.
    pub fn write(&self, data: &[u8]) -> Result<usize, Errno> {
        self.session.write(data)
    }

    /// Non-blocking read: `None` means "would block" (queue empty,
    /// session still open).
    pub fn read_nonblocking(&self) -> Option<Vec<u8>> {
        self.session.try_read()
    }

    /// Blocking read: `None` means end-of-file (session closed with
    /// nothing left queued).
    pub fn read_blocking(&self) -> Option<Vec<u8>> {
        self.session.read_blocking()
    }

    /// Readiness for `poll`: readable iff the outqueue is non-empty;
    /// writable always.
    pub fn poll_readable(&self) -> bool {
        self.session.is_readable()
    }

    /// Dispatch a control operation (`MAP_SURFACE`/`STATS`).
    pub fn ioctl(&self, op: ControlOp) -> Result<IoctlResult, Errno> {
        match op {
            ControlOp::MapSurface(sid) => {
                let (sid, stride, total) = self.session.map_surface(sid)?;
                Ok(IoctlResult::MapSurface { sid, stride, total })
            }
            ControlOp::Stats => Ok(IoctlResult::Stats(self.session.stats())),
        }
    }

    /// Map exactly `requested_len` bytes at offset 0, backed by the
    /// surface armed by the most recent successful `MAP_SURFACE`. Any
    /// other size is `EINVAL`; the arming slot is one-shot and is
    /// consumed here whether or not the size matches.
    pub fn mmap(&self, requested_len: usize) -> Result<Arc<SurfaceMemory>, Errno> {
        let memory = self.session.resolve_mmap_selection()?;
        if requested_len != memory.len() {
            return Err(Errno::EINVAL);
        }
        Ok(memory)
    }

    /// Explicitly close the session early. Idempotent; also runs on drop.
    pub fn close(&self) {
        self.session.close();
        self.device.sessions.lock().unwrap().remove(&self.id);
        log::debug!("drawfs: session {} closed", self.id);
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Decoded result of an `ioctl` control operation.
pub enum IoctlResult {
    MapSurface { sid: u32, stride: u32, total: u32 },
    Stats(Stats),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_independent_sessions() {
        let device = Device::new(DeviceConfig::default());
        let a = device.open();
        let b = device.open();
        assert_ne!(a.id(), b.id());
        assert_eq!(device.open_session_count(), 2);
    }

    #[test]
    fn close_removes_from_table() {
        let device = Device::new(DeviceConfig::default());
        let handle = device.open();
        handle.close();
        assert_eq!(device.open_session_count(), 0);
    }

    #[test]
    fn drop_also_closes() {
        let device = Device::new(DeviceConfig::default());
        {
            let _handle = device.open();
            assert_eq!(device.open_session_count(), 1);
        }
        assert_eq!(device.open_session_count(), 0);
    }

    #[test]
    fn mmap_without_arming_is_einval() {
        let device = Device::new(DeviceConfig::default());
        let handle = device.open();
        assert!(matches!(handle.mmap(4096), Err(Errno::EINVAL)));
    }

    #[test]
    fn mmap_wrong_size_is_einval() {
        let device = Device::new(DeviceConfig::default());
        let handle = device.open();
        handle
            .write(&drawfs_abi::wire::encode_single_message_frame(
                drawfs_abi::wire::msg::REQ_HELLO,
                1,
                &[0u8; 12],
                1,
            ))
            .unwrap();
        handle.read_nonblocking().unwrap();
        handle
            .write(&drawfs_abi::wire::encode_single_message_frame(
                drawfs_abi::wire::msg::REQ_DISPLAY_OPEN,
                2,
                &1u32.to_le_bytes(),
                1,
            ))
            .unwrap();
        handle.read_nonblocking().unwrap();

        let mut create_payload = Vec::new();
        create_payload.extend_from_slice(&4u32.to_le_bytes());
        create_payload.extend_from_slice(&4u32.to_le_bytes());
        create_payload.extend_from_slice(&1u32.to_le_bytes());
        create_payload.extend_from_slice(&0u32.to_le_bytes());
        handle
            .write(&drawfs_abi::wire::encode_single_message_frame(
                drawfs_abi::wire::msg::REQ_SURFACE_CREATE,
                3,
                &create_payload,
                1,
            ))
            .unwrap();
        handle.read_nonblocking().unwrap();

        match handle.ioctl(ControlOp::MapSurface(1)).unwrap() {
            IoctlResult::MapSurface { total, .. } => assert_eq!(total, 64),
            _ => panic!("expected MapSurface result"),
        }
        assert!(matches!(handle.mmap(4096), Err(Errno::EINVAL)));
    }
}
