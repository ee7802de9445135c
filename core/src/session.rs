//! Per-session state machine: handshake, display binding, surface
//! lifecycle, and presentation.
//!
//! One `Session` is created per device open and guarded by a single
//! mutex covering the inbound codec buffer, `SurfaceTable`,
//! `MapSelector`, and counters — a per-session mutex. `OutQueue`
//! manages its own locking and is deliberately kept outside this
//! mutex so a blocked reader never waits on it.

use std::sync::{Arc, Mutex};

use drawfs_abi::error::Errno;
use drawfs_abi::stats::Stats;
use drawfs_abi::wire::{PROTOCOL_VERSION, encode_single_message_frame, msg};
use drawfs_lib::DeviceConfig;
use drawfs_mm::SurfaceMemory;
use drawfs_video::{MapSelector, OutQueue, Presenter, Registry, SurfaceTable};

use crate::codec::{Codec, DecodedMessage, FrameDecodeError};

/// The protocol handshake/binding progression a session moves
/// through. `DisplayBound` and `Active` share every gating rule —
/// no transition names a distinct `Active` entry condition;
/// `state()` reports `Active` once a display is bound and at least
/// one surface exists, purely as a richer status label for
/// `STATS`/diagnostics, not as a separate gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Fresh,
    Negotiated,
    DisplayBound,
    Active,
}

struct Inner {
    negotiated: bool,
    display_bound: Option<u32>,
    surfaces: SurfaceTable,
    map_selector: MapSelector,
    presenter: Presenter,
    stats: Stats,
    inbuf: Vec<u8>,
}

/// One open of the DrawFS device. Mutually isolated from every other
/// `Session`: no surface id, mmap arming, or event it produces is
/// ever visible to another session.
pub struct Session {
    registry: Registry,
    inner: Mutex<Inner>,
    outq: OutQueue,
    max_inbuf: usize,
}

impl Session {
    /// Build a session bound by `DeviceConfig::default()`'s limits.
    pub fn new(registry: Registry) -> Self {
        Self::with_config(registry, &DeviceConfig::default())
    }

    /// Build a session whose per-surface, per-session, queue, and
    /// inbound-buffer bounds come from `config` rather than defaults.
    pub fn with_config(registry: Registry, config: &DeviceConfig) -> Self {
        Self {
            registry,
            inner: Mutex::new(Inner {
                negotiated: false,
                display_bound: None,
                surfaces: SurfaceTable::new(
                    config.max_surface_bytes,
                    config.max_surfaces_per_session,
                ),
                map_selector: MapSelector::new(),
                presenter: Presenter::new(),
                stats: Stats::default(),
                inbuf: Vec::new(),
            }),
            outq: OutQueue::new(config.max_outq_depth, config.max_outq_bytes),
            max_inbuf: config.max_inbuf,
        }
    }

    pub fn state(&self) -> SessionState {
        let inner = self.inner.lock().unwrap();
        if inner.display_bound.is_some() {
            if inner.surfaces.is_empty() {
                SessionState::DisplayBound
            } else {
                SessionState::Active
            }
        } else if inner.negotiated {
            SessionState::Negotiated
        } else {
            SessionState::Fresh
        }
    }

    pub fn stats(&self) -> Stats {
        let inner = self.inner.lock().unwrap();
        let mut stats = inner.stats;
        stats.evq_depth = self.outq.depth() as u32;
        stats.inbuf_bytes = inner.inbuf.len() as u32;
        stats
    }

    /// Accept `data` as a whole or reject it with `ENOSPC`/`EMSGSIZE`;
    /// never blocks. On success, every complete frame accumulated is
    /// parsed and dispatched before returning.
    pub fn write(&self, data: &[u8]) -> Result<usize, Errno> {
        let mut inner = self.inner.lock().unwrap();

        if inner.inbuf.len() + data.len() > self.max_inbuf {
            return Err(Errno::EMSGSIZE);
        }
        inner.inbuf.extend_from_slice(data);
        inner.stats.bytes_in += data.len() as u64;

        loop {
            let decode_result = Codec::decode(&inner.inbuf);
            match decode_result {
                Ok((frames, consumed)) => {
                    inner.inbuf.drain(..consumed);
                    if frames.is_empty() {
                        break;
                    }
                    for frame in frames {
                        inner.stats.frames_received += 1;
                        if frame.version != PROTOCOL_VERSION {
                            inner.stats.frames_invalid += 1;
                            if !inner.negotiated {
                                let msg_id = frame.messages.first().map(|m| m.msg_id).unwrap_or(0);
                                self.send_generic(&mut inner, msg_id, Errno::EINVAL)?;
                            }
                            continue;
                        }
                        inner.stats.frames_processed += 1;
                        for message in frame.messages {
                            self.dispatch(&mut inner, message)?;
                        }
                    }
                    if inner.inbuf.is_empty() {
                        break;
                    }
                }
                Err(FrameDecodeError::BadMagic) | Err(FrameDecodeError::Malformed) => {
                    inner.stats.frames_invalid += 1;
                    inner.inbuf.clear();
                    break;
                }
            }
        }

        Ok(data.len())
    }

    /// Pop one outbound frame without blocking.
    pub fn try_read(&self) -> Option<Vec<u8>> {
        let frame = self.outq.try_dequeue();
        if let Some(f) = &frame {
            self.account_bytes_out(f.len());
        }
        frame
    }

    /// Pop one outbound frame, blocking until one is ready or the
    /// session closes (`None` then means end-of-file).
    pub fn read_blocking(&self) -> Option<Vec<u8>> {
        let frame = self.outq.dequeue_blocking();
        if let Some(f) = &frame {
            self.account_bytes_out(f.len());
        }
        frame
    }

    fn account_bytes_out(&self, len: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.stats.bytes_out += len as u64;
    }

    pub fn is_readable(&self) -> bool {
        self.outq.is_readable()
    }

    /// `MAP_SURFACE` control operation: validate `sid`, arm the
    /// mmap selector, and return the reply fields.
    pub fn map_surface(&self, sid: u32) -> Result<(u32, u32, u32), Errno> {
        let mut inner = self.inner.lock().unwrap();
        let surface = inner.surfaces.get(sid).cloned().ok_or(Errno::ENOENT)?;
        inner.map_selector.arm(sid);
        Ok((surface.id, surface.stride, surface.total_bytes))
    }

    /// Resolve the session's currently armed mmap selection, one-shot.
    /// Used by the device facade's mmap entry point.
    pub fn resolve_mmap_selection(&self) -> Result<Arc<SurfaceMemory>, Errno> {
        let mut inner = self.inner.lock().unwrap();
        let sid = inner.map_selector.take().ok_or(Errno::EINVAL)?;
        inner
            .surfaces
            .get(sid)
            .map(|s| Arc::clone(&s.pixels))
            .ok_or(Errno::EINVAL)
    }

    /// Close the session: drain the outbound queue, wake any blocked
    /// reader with end-of-file, and drop every surface's table
    /// reference to its pixel memory (live client mappings, if any,
    /// keep that memory alive via their own `Arc`).
    pub fn close(&self) {
        self.outq.close();
        let mut inner = self.inner.lock().unwrap();
        let ids: Vec<u32> = inner.surfaces.ids().collect();
        for id in ids {
            let _ = inner.surfaces.destroy(id);
        }
        inner.map_selector.take();
    }

    fn dispatch(&self, inner: &mut Inner, message: DecodedMessage) -> Result<(), Errno> {
        inner.stats.messages_processed += 1;
        match message.msg_type {
            msg::REQ_HELLO => self.handle_hello(inner, &message),
            msg::REQ_DISPLAY_LIST => self.handle_display_list(inner, &message),
            msg::REQ_DISPLAY_OPEN => self.handle_display_open(inner, &message),
            msg::REQ_SURFACE_CREATE => self.handle_surface_create(inner, &message),
            msg::REQ_SURFACE_DESTROY => self.handle_surface_destroy(inner, &message),
            msg::REQ_SURFACE_PRESENT => self.handle_surface_present(inner, &message),
            _ => {
                inner.stats.messages_unsupported += 1;
                self.send_generic(inner, message.msg_id, Errno::EINVAL)
            }
        }
    }

    fn send_generic(&self, _inner: &mut Inner, msg_id: u32, status: Errno) -> Result<(), Errno> {
        let payload = status.as_c_int().to_le_bytes();
        let frame = encode_single_message_frame(msg::RPL_GENERIC, msg_id, &payload, 0);
        self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC)
    }

    fn handle_hello(&self, inner: &mut Inner, message: &DecodedMessage) -> Result<(), Errno> {
        if inner.negotiated {
            return self.send_generic(inner, message.msg_id, Errno::EINVAL);
        }
        if message.payload.len() < 12 {
            return self.send_generic(inner, message.msg_id, Errno::EINVAL);
        }
        let flags = u32_at(&message.payload, 4);
        let max_reply = u32_at(&message.payload, 8);

        inner.negotiated = true;
        log::debug!("drawfs: negotiated flags={flags:#x} max_reply={max_reply}");

        let mut payload = Vec::with_capacity(16);
        payload.extend_from_slice(&Errno::Success.as_c_int().to_le_bytes());
        payload.extend_from_slice(&1u16.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&flags.to_le_bytes());
        payload.extend_from_slice(&max_reply.to_le_bytes());
        let frame = encode_single_message_frame(msg::RPL_HELLO, message.msg_id, &payload, 0);
        self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC)
    }

    fn handle_display_list(
        &self,
        inner: &mut Inner,
        message: &DecodedMessage,
    ) -> Result<(), Errno> {
        if !inner.negotiated {
            return self.send_generic(inner, message.msg_id, Errno::EINVAL);
        }
        let displays = self.registry.displays();
        let mut payload = Vec::with_capacity(4 + displays.len() * 20);
        payload.extend_from_slice(&(displays.len() as u32).to_le_bytes());
        for d in displays {
            payload.extend_from_slice(&d.id.to_le_bytes());
            payload.extend_from_slice(&d.width.to_le_bytes());
            payload.extend_from_slice(&d.height.to_le_bytes());
            payload.extend_from_slice(&d.refresh_mhz.to_le_bytes());
            payload.extend_from_slice(&d.flags.to_le_bytes());
        }
        let frame = encode_single_message_frame(msg::RPL_DISPLAY_LIST, message.msg_id, &payload, 0);
        self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC)
    }

    fn handle_display_open(
        &self,
        inner: &mut Inner,
        message: &DecodedMessage,
    ) -> Result<(), Errno> {
        let status;
        let mut active_id = 0u32;

        if !inner.negotiated || message.payload.len() < 4 {
            status = Errno::EINVAL;
        } else {
            let display_id = u32_at(&message.payload, 0);
            if self.registry.contains(display_id) {
                inner.display_bound = Some(display_id);
                active_id = display_id;
                status = Errno::Success;
                log::debug!("drawfs: bound display {display_id}");
            } else {
                status = Errno::ENOENT;
            }
        }

        let mut payload = Vec::with_capacity(12);
        payload.extend_from_slice(&status.as_c_int().to_le_bytes());
        payload.extend_from_slice(&active_id.to_le_bytes());
        payload.extend_from_slice(&active_id.to_le_bytes());
        let frame = encode_single_message_frame(msg::RPL_DISPLAY_OPEN, message.msg_id, &payload, 0);
        self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC)
    }

    fn handle_surface_create(
        &self,
        inner: &mut Inner,
        message: &DecodedMessage,
    ) -> Result<(), Errno> {
        let (status, sid, stride, total) =
            if inner.display_bound.is_none() || message.payload.len() < 16 {
                (Errno::EINVAL, 0, 0, 0)
            } else {
                let width = u32_at(&message.payload, 0);
                let height = u32_at(&message.payload, 4);
                let format = u32_at(&message.payload, 8);
                match inner.surfaces.create(width, height, format) {
                    Ok(surface) => (
                        Errno::Success,
                        surface.id,
                        surface.stride,
                        surface.total_bytes,
                    ),
                    Err(err) => (err.to_errno(), 0, 0, 0),
                }
            };

        let mut payload = Vec::with_capacity(16);
        payload.extend_from_slice(&status.as_c_int().to_le_bytes());
        payload.extend_from_slice(&sid.to_le_bytes());
        payload.extend_from_slice(&stride.to_le_bytes());
        payload.extend_from_slice(&total.to_le_bytes());
        let frame =
            encode_single_message_frame(msg::RPL_SURFACE_CREATE, message.msg_id, &payload, 0);
        self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC)
    }

    fn handle_surface_destroy(
        &self,
        inner: &mut Inner,
        message: &DecodedMessage,
    ) -> Result<(), Errno> {
        let (status, sid) = if inner.display_bound.is_none() || message.payload.len() < 4 {
            (Errno::EINVAL, 0)
        } else {
            let sid = u32_at(&message.payload, 0);
            if sid == 0 {
                (Errno::EINVAL, 0)
            } else {
                match inner.surfaces.destroy(sid) {
                    Ok(()) => {
                        inner.map_selector.clear_if(sid);
                        (Errno::Success, sid)
                    }
                    Err(err) => (err.to_errno(), sid),
                }
            }
        };

        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&status.as_c_int().to_le_bytes());
        payload.extend_from_slice(&sid.to_le_bytes());
        let frame =
            encode_single_message_frame(msg::RPL_SURFACE_DESTROY, message.msg_id, &payload, 0);
        self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC)
    }

    fn handle_surface_present(
        &self,
        inner: &mut Inner,
        message: &DecodedMessage,
    ) -> Result<(), Errno> {
        if inner.display_bound.is_none() || message.payload.len() < 16 {
            let mut payload = Vec::with_capacity(16);
            payload.extend_from_slice(&Errno::EINVAL.as_c_int().to_le_bytes());
            payload.extend_from_slice(&0u32.to_le_bytes());
            payload.extend_from_slice(&0u64.to_le_bytes());
            let frame =
                encode_single_message_frame(msg::RPL_SURFACE_PRESENT, message.msg_id, &payload, 0);
            return self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC);
        }

        let sid = u32_at(&message.payload, 0);
        let cookie = u64_at(&message.payload, 8);

        if !inner.surfaces.contains(sid) {
            let mut payload = Vec::with_capacity(16);
            payload.extend_from_slice(&Errno::ENOENT.as_c_int().to_le_bytes());
            payload.extend_from_slice(&sid.to_le_bytes());
            payload.extend_from_slice(&cookie.to_le_bytes());
            let frame =
                encode_single_message_frame(msg::RPL_SURFACE_PRESENT, message.msg_id, &payload, 0);
            return self.outq.enqueue(frame).map_err(|_| Errno::ENOSPC);
        }

        match inner
            .presenter
            .present(&self.outq, message.msg_id, sid, cookie)
        {
            Ok(outcome) => {
                inner.stats.events_enqueued += 1;
                if outcome.event_dropped {
                    inner.stats.events_dropped += 1;
                }
                Ok(())
            }
            Err(_) => Err(Errno::ENOSPC),
        }
    }
}

fn u32_at(payload: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(payload[offset..offset + 4].try_into().unwrap())
}

fn u64_at(payload: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(payload[offset..offset + 8].try_into().unwrap())
}
