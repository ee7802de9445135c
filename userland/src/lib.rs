//! Client-side helpers for the DrawFS wire protocol: request encoders
//! and reply/event decoders shared by the demo binary and the
//! integration test crate.
//!
//! This is the client half of the device facade — it knows nothing
//! about session state, only how to build request frames and parse
//! the frames a `Session` emits.

use drawfs_abi::wire::{FrameHeader, MsgHeader, encode_single_message_frame, msg};

pub fn hello(msg_id: u32, major: u16, minor: u16, flags: u32, max_reply: u32) -> Vec<u8> {
    let mut payload = Vec::with_capacity(12);
    payload.extend_from_slice(&major.to_le_bytes());
    payload.extend_from_slice(&minor.to_le_bytes());
    payload.extend_from_slice(&flags.to_le_bytes());
    payload.extend_from_slice(&max_reply.to_le_bytes());
    encode_single_message_frame(msg::REQ_HELLO, msg_id, &payload, msg_id)
}

pub fn display_list(msg_id: u32) -> Vec<u8> {
    encode_single_message_frame(msg::REQ_DISPLAY_LIST, msg_id, &[], msg_id)
}

pub fn display_open(msg_id: u32, display_id: u32) -> Vec<u8> {
    encode_single_message_frame(
        msg::REQ_DISPLAY_OPEN,
        msg_id,
        &display_id.to_le_bytes(),
        msg_id,
    )
}

pub fn surface_create(msg_id: u32, width: u32, height: u32, format: u32, flags: u32) -> Vec<u8> {
    let mut payload = Vec::with_capacity(16);
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    payload.extend_from_slice(&format.to_le_bytes());
    payload.extend_from_slice(&flags.to_le_bytes());
    encode_single_message_frame(msg::REQ_SURFACE_CREATE, msg_id, &payload, msg_id)
}

pub fn surface_destroy(msg_id: u32, sid: u32) -> Vec<u8> {
    encode_single_message_frame(msg::REQ_SURFACE_DESTROY, msg_id, &sid.to_le_bytes(), msg_id)
}

pub fn surface_present(msg_id: u32, sid: u32, flags: u32, cookie: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(16);
    payload.extend_from_slice(&sid.to_le_bytes());
    payload.extend_from_slice(&flags.to_le_bytes());
    payload.extend_from_slice(&cookie.to_le_bytes());
    encode_single_message_frame(msg::REQ_SURFACE_PRESENT, msg_id, &payload, msg_id)
}

/// One decoded display entry from `RPL_DISPLAY_LIST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEntry {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub refresh_mhz: u32,
    pub flags: u32,
}

/// Every reply/event type a client can receive, decoded from one
/// single-message frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Hello {
        status: i32,
        major: u16,
        minor: u16,
        flags: u32,
        max_reply: u32,
    },
    Generic {
        status: i32,
    },
    DisplayList {
        displays: Vec<DisplayEntry>,
    },
    DisplayOpen {
        status: i32,
        handle: u32,
        active_id: u32,
    },
    SurfaceCreate {
        status: i32,
        sid: u32,
        stride: u32,
        total: u32,
    },
    SurfaceDestroy {
        status: i32,
        sid: u32,
    },
    SurfacePresent {
        status: i32,
        sid: u32,
        cookie: u64,
    },
    SurfacePresented {
        sid: u32,
        status: u32,
        cookie: u64,
    },
    Unknown {
        msg_type: u16,
    },
}

/// Parse one frame (as emitted by a `Session`) into its `Reply`. Only
/// handles single-message frames, matching what the server ever sends.
pub fn decode_frame(bytes: &[u8]) -> Reply {
    let fh_bytes: [u8; FrameHeader::WIRE_SIZE] =
        bytes[..FrameHeader::WIRE_SIZE].try_into().unwrap();
    let _fh = FrameHeader::from_bytes(&fh_bytes);
    let mh_bytes: [u8; MsgHeader::WIRE_SIZE] = bytes
        [FrameHeader::WIRE_SIZE..FrameHeader::WIRE_SIZE + MsgHeader::WIRE_SIZE]
        .try_into()
        .unwrap();
    let mh = MsgHeader::from_bytes(&mh_bytes);
    let payload_start = FrameHeader::WIRE_SIZE + MsgHeader::WIRE_SIZE;
    let payload_len = mh.msg_bytes as usize - MsgHeader::WIRE_SIZE;
    let payload = &bytes[payload_start..payload_start + payload_len];

    match mh.msg_type {
        msg::RPL_HELLO if payload.len() >= 16 => Reply::Hello {
            status: i32_at(payload, 0),
            major: u16_at(payload, 4),
            minor: u16_at(payload, 6),
            flags: u32_at(payload, 8),
            max_reply: u32_at(payload, 12),
        },
        msg::RPL_GENERIC => Reply::Generic {
            status: i32_at(payload, 0),
        },
        msg::RPL_DISPLAY_LIST => {
            let count = u32_at(payload, 0) as usize;
            let mut displays = Vec::with_capacity(count);
            for i in 0..count {
                let off = 4 + i * 20;
                displays.push(DisplayEntry {
                    id: u32_at(payload, off),
                    width: u32_at(payload, off + 4),
                    height: u32_at(payload, off + 8),
                    refresh_mhz: u32_at(payload, off + 12),
                    flags: u32_at(payload, off + 16),
                });
            }
            Reply::DisplayList { displays }
        }
        msg::RPL_DISPLAY_OPEN => Reply::DisplayOpen {
            status: i32_at(payload, 0),
            handle: u32_at(payload, 4),
            active_id: u32_at(payload, 8),
        },
        msg::RPL_SURFACE_CREATE => Reply::SurfaceCreate {
            status: i32_at(payload, 0),
            sid: u32_at(payload, 4),
            stride: u32_at(payload, 8),
            total: u32_at(payload, 12),
        },
        msg::RPL_SURFACE_DESTROY => Reply::SurfaceDestroy {
            status: i32_at(payload, 0),
            sid: u32_at(payload, 4),
        },
        msg::RPL_SURFACE_PRESENT => Reply::SurfacePresent {
            status: i32_at(payload, 0),
            sid: u32_at(payload, 4),
            cookie: u64_at(payload, 8),
        },
        msg::EVT_SURFACE_PRESENTED => Reply::SurfacePresented {
            sid: u32_at(payload, 0),
            status: u32_at(payload, 4),
            cookie: u64_at(payload, 8),
        },
        other => Reply::Unknown { msg_type: other },
    }
}

fn i32_at(p: &[u8], off: usize) -> i32 {
    i32::from_le_bytes(p[off..off + 4].try_into().unwrap())
}
fn u16_at(p: &[u8], off: usize) -> u16 {
    u16::from_le_bytes(p[off..off + 2].try_into().unwrap())
}
fn u32_at(p: &[u8], off: usize) -> u32 {
    u32::from_le_bytes(p[off..off + 4].try_into().unwrap())
}
fn u64_at(p: &[u8], off: usize) -> u64 {
    u64::from_le_bytes(p[off..off + 8].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_hello_reply_shape() {
        use drawfs_abi::error::Errno;
        let mut payload = Vec::new();
        payload.extend_from_slice(&Errno::Success.as_c_int().to_le_bytes());
        payload.extend_from_slice(&1u16.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&65536u32.to_le_bytes());
        let frame = encode_single_message_frame(msg::RPL_HELLO, 1, &payload, 1);
        match decode_frame(&frame) {
            Reply::Hello {
                status,
                major,
                minor,
                max_reply,
                ..
            } => {
                assert_eq!(status, 0);
                assert_eq!(major, 1);
                assert_eq!(minor, 0);
                assert_eq!(max_reply, 65536);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
