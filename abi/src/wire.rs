//! Frame and message header layouts for the DrawFS wire protocol.
//!
//! Everything here is little-endian, 4-byte aligned, and `#[repr(C)]`
//! for byte-for-byte stability across the codec boundary.

/// `FrameHeader::magic` value identifying a DrawFS frame ("DRW1" as
/// a little-endian u32).
pub const FRAME_MAGIC: u32 = 0x3157_5244;

/// Current wire protocol version (major 1, minor 0).
pub const PROTOCOL_VERSION: u16 = 0x0100;

/// Size in bytes of [`FrameHeader`] on the wire.
pub const FRAME_HEADER_BYTES: u16 = 16;

/// Size in bytes of [`MsgHeader`] on the wire.
pub const MSG_HEADER_BYTES: usize = 16;

/// Frame header: precedes one or more messages in a frame body.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub magic: u32,
    pub version: u16,
    pub header_bytes: u16,
    pub frame_bytes: u32,
    pub frame_id: u32,
}

impl FrameHeader {
    pub const WIRE_SIZE: usize = FRAME_HEADER_BYTES as usize;

    pub const fn new(frame_bytes: u32, frame_id: u32) -> Self {
        Self {
            magic: FRAME_MAGIC,
            version: PROTOCOL_VERSION,
            header_bytes: FRAME_HEADER_BYTES,
            frame_bytes,
            frame_id,
        }
    }

    pub fn to_bytes(self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf[6..8].copy_from_slice(&self.header_bytes.to_le_bytes());
        buf[8..12].copy_from_slice(&self.frame_bytes.to_le_bytes());
        buf[12..16].copy_from_slice(&self.frame_id.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::WIRE_SIZE]) -> Self {
        Self {
            magic: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            version: u16::from_le_bytes(buf[4..6].try_into().unwrap()),
            header_bytes: u16::from_le_bytes(buf[6..8].try_into().unwrap()),
            frame_bytes: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            frame_id: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
        }
    }
}

/// Message header: precedes one message's payload within a frame body.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MsgHeader {
    pub msg_type: u16,
    pub flags: u16,
    pub msg_bytes: u32,
    pub msg_id: u32,
    pub reserved: u32,
}

impl MsgHeader {
    pub const WIRE_SIZE: usize = MSG_HEADER_BYTES;

    pub const fn new(msg_type: u16, msg_bytes: u32, msg_id: u32) -> Self {
        Self {
            msg_type,
            flags: 0,
            msg_bytes,
            msg_id,
            reserved: 0,
        }
    }

    pub fn to_bytes(self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        buf[0..2].copy_from_slice(&self.msg_type.to_le_bytes());
        buf[2..4].copy_from_slice(&self.flags.to_le_bytes());
        buf[4..8].copy_from_slice(&self.msg_bytes.to_le_bytes());
        buf[8..12].copy_from_slice(&self.msg_id.to_le_bytes());
        buf[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; Self::WIRE_SIZE]) -> Self {
        Self {
            msg_type: u16::from_le_bytes(buf[0..2].try_into().unwrap()),
            flags: u16::from_le_bytes(buf[2..4].try_into().unwrap()),
            msg_bytes: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            msg_id: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            reserved: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
        }
    }
}

/// Align `value` up to the next multiple of 4.
pub const fn align4(value: u32) -> u32 {
    (value + 3) & !3
}

extern crate alloc;
use alloc::vec::Vec;

/// Build one frame carrying a single message: header, message header,
/// payload, zero-padded to a 4-byte multiple. Every reply and event
/// is emitted this way, one message per frame.
pub fn encode_single_message_frame(
    msg_type: u16,
    msg_id: u32,
    payload: &[u8],
    frame_id: u32,
) -> Vec<u8> {
    let msg_raw = MsgHeader::WIRE_SIZE as u32 + payload.len() as u32;
    let msg_bytes = align4(msg_raw);
    let frame_raw = FrameHeader::WIRE_SIZE as u32 + msg_bytes;
    let frame_bytes = align4(frame_raw);

    let mut buf = Vec::with_capacity(frame_bytes as usize);
    buf.extend_from_slice(&FrameHeader::new(frame_bytes, frame_id).to_bytes());
    buf.extend_from_slice(&MsgHeader::new(msg_type, msg_bytes, msg_id).to_bytes());
    buf.extend_from_slice(payload);
    buf.resize(frame_bytes as usize, 0);
    buf
}

/// Message type codes for every request, reply, and event the wire
/// protocol defines.
pub mod msg {
    pub const REQ_HELLO: u16 = 0x0001;
    pub const REQ_DISPLAY_LIST: u16 = 0x0010;
    pub const REQ_DISPLAY_OPEN: u16 = 0x0011;
    pub const REQ_SURFACE_CREATE: u16 = 0x0020;
    pub const REQ_SURFACE_DESTROY: u16 = 0x0021;
    pub const REQ_SURFACE_PRESENT: u16 = 0x0022;

    pub const RPL_HELLO: u16 = 0x8001;
    pub const RPL_GENERIC: u16 = 0x8001;
    pub const RPL_DISPLAY_LIST: u16 = 0x8010;
    pub const RPL_DISPLAY_OPEN: u16 = 0x8011;
    pub const RPL_SURFACE_CREATE: u16 = 0x8020;
    pub const RPL_SURFACE_DESTROY: u16 = 0x8021;
    pub const RPL_SURFACE_PRESENT: u16 = 0x8022;

    pub const EVT_SURFACE_PRESENTED: u16 = 0x9002;
}

/// Pixel format codes. Only `XRGB8888` is supported; any other value
/// in a `SURFACE_CREATE` request fails with `EPROTONOSUPPORT`.
pub const FORMAT_XRGB8888: u32 = 1;

bitflags::bitflags! {
    /// Flags carried in `REQ_HELLO`. Reserved for future negotiation;
    /// no bit currently changes server behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HelloFlags: u32 {
        const NONE = 0;
    }
}
