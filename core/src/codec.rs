//! Parses a contiguous byte buffer into zero or more complete frames,
//! each carrying zero or more messages.
//!
//! The codec is purely mechanical: it validates magic, alignment, and
//! length bounds and hands back decoded frames plus how many bytes
//! were consumed. It does not know about protocol version negotiation
//! or session state — `Session` owns that, since whether a version
//! mismatch is a negotiation failure or a hard framing error depends
//! on whether this is the session's first frame.

use drawfs_abi::wire::{FrameHeader, MsgHeader};

/// One decoded message: type, echoed id, and its raw payload (the
/// message header's trailing padding bytes, if any, are included at
/// the tail and are ignored by handlers that know their fixed shape).
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub msg_type: u16,
    pub msg_id: u32,
    pub payload: Vec<u8>,
}

/// One decoded frame: its id, the protocol version it claimed, and
/// the messages in its body, in wire order.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub frame_id: u32,
    pub version: u16,
    pub messages: Vec<DecodedMessage>,
}

/// A structurally malformed frame or message. There is no resync
/// within a session: the caller discards its entire inbound buffer
/// on this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDecodeError {
    /// `magic` did not match `FRAME_MAGIC`.
    BadMagic,
    /// A header or length field violated its bounds (wrong
    /// `header_bytes`, non-4-aligned `frame_bytes`/`msg_bytes`, a
    /// message exceeding its frame body, …).
    Malformed,
}

pub struct Codec;

impl Codec {
    /// Decode as many complete frames as `buf` contains. Returns the
    /// decoded frames and the number of bytes consumed; any trailing
    /// bytes that do not yet form a complete frame are left
    /// unconsumed (`needs_more`) and must be retained by the caller.
    pub fn decode(buf: &[u8]) -> Result<(Vec<DecodedFrame>, usize), FrameDecodeError> {
        let mut frames = Vec::new();
        let mut pos = 0usize;

        loop {
            if buf.len() - pos < FrameHeader::WIRE_SIZE {
                break;
            }
            let header_bytes: [u8; FrameHeader::WIRE_SIZE] =
                buf[pos..pos + FrameHeader::WIRE_SIZE].try_into().unwrap();
            let header = FrameHeader::from_bytes(&header_bytes);

            if header.magic != drawfs_abi::wire::FRAME_MAGIC {
                return Err(FrameDecodeError::BadMagic);
            }
            if header.header_bytes != drawfs_abi::wire::FRAME_HEADER_BYTES
                || header.frame_bytes < header.header_bytes as u32
                || !header.frame_bytes.is_multiple_of(4)
            {
                return Err(FrameDecodeError::Malformed);
            }

            let frame_bytes = header.frame_bytes as usize;
            if buf.len() - pos < frame_bytes {
                break;
            }

            let body = &buf[pos + FrameHeader::WIRE_SIZE..pos + frame_bytes];
            let messages = Self::decode_messages(body)?;
            frames.push(DecodedFrame {
                frame_id: header.frame_id,
                version: header.version,
                messages,
            });
            pos += frame_bytes;
        }

        Ok((frames, pos))
    }

    fn decode_messages(mut body: &[u8]) -> Result<Vec<DecodedMessage>, FrameDecodeError> {
        let mut out = Vec::new();
        while !body.is_empty() {
            if body.len() < MsgHeader::WIRE_SIZE {
                return Err(FrameDecodeError::Malformed);
            }
            let hdr_bytes: [u8; MsgHeader::WIRE_SIZE] =
                body[..MsgHeader::WIRE_SIZE].try_into().unwrap();
            let hdr = MsgHeader::from_bytes(&hdr_bytes);

            let msg_bytes = hdr.msg_bytes as usize;
            if msg_bytes < MsgHeader::WIRE_SIZE
                || !hdr.msg_bytes.is_multiple_of(4)
                || msg_bytes > body.len()
            {
                return Err(FrameDecodeError::Malformed);
            }

            let payload = body[MsgHeader::WIRE_SIZE..msg_bytes].to_vec();
            out.push(DecodedMessage {
                msg_type: hdr.msg_type,
                msg_id: hdr.msg_id,
                payload,
            });
            body = &body[msg_bytes..];
        }
        Ok(out)
    }
}
