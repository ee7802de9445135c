//! Accepts present requests, orders the reply before the event, and
//! stamps each presentation event with a per-session monotonic
//! sequence number exposed as its `msg_id`.

use drawfs_abi::error::Errno;
use drawfs_abi::wire::{encode_single_message_frame, msg};

use crate::out_queue::{EnqueueError, OutQueue};

/// What happened to the asynchronous event half of a present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentOutcome {
    /// `true` if the event was dropped because the queue was full.
    /// The reply (already enqueued) still reached the client.
    pub event_dropped: bool,
}

/// Presents go through one `Presenter` per session so that its
/// `msg_id` sequence numbers stay a clean monotonic count for that
/// session alone.
#[derive(Default)]
pub struct Presenter {
    seqno: u32,
}

impl Presenter {
    pub fn new() -> Self {
        Self { seqno: 0 }
    }

    /// Enqueue `RPL_SURFACE_PRESENT` then `EVT_SURFACE_PRESENTED` for
    /// a successful present. `req_msg_id` is the client's original
    /// request id, echoed on the reply only — the event carries its
    /// own sequence number.
    ///
    /// The reply's enqueue failing is a caller-visible backpressure
    /// error (`ENOSPC`); the event's enqueue failing after a
    /// successful reply is instead counted and reported via
    /// `PresentOutcome::event_dropped` — client-initiated outputs
    /// propagate backpressure, server-initiated events are dropped.
    pub fn present(
        &mut self,
        outq: &OutQueue,
        req_msg_id: u32,
        sid: u32,
        cookie: u64,
    ) -> Result<PresentOutcome, EnqueueError> {
        let mut reply_payload = Vec::with_capacity(16);
        reply_payload.extend_from_slice(&Errno::Success.as_c_int().to_le_bytes());
        reply_payload.extend_from_slice(&sid.to_le_bytes());
        reply_payload.extend_from_slice(&cookie.to_le_bytes());
        let reply =
            encode_single_message_frame(msg::RPL_SURFACE_PRESENT, req_msg_id, &reply_payload, 0);
        outq.enqueue(reply)?;

        self.seqno = self.seqno.wrapping_add(1);
        let mut event_payload = Vec::with_capacity(16);
        event_payload.extend_from_slice(&sid.to_le_bytes());
        event_payload.extend_from_slice(&(Errno::Success.as_c_int() as u32).to_le_bytes());
        event_payload.extend_from_slice(&cookie.to_le_bytes());
        let event =
            encode_single_message_frame(msg::EVT_SURFACE_PRESENTED, self.seqno, &event_payload, 0);
        let event_dropped = outq.enqueue(event).is_err();

        Ok(PresentOutcome { event_dropped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_u32(b: &[u8]) -> u32 {
        u32::from_le_bytes(b.try_into().unwrap())
    }
    fn decode_u64(b: &[u8]) -> u64 {
        u64::from_le_bytes(b.try_into().unwrap())
    }

    #[test]
    fn reply_then_event_in_order_with_matching_cookie() {
        let outq = OutQueue::default();
        let mut presenter = Presenter::new();
        presenter
            .present(&outq, 42, 1, 0x1111_2222_3333_4444)
            .unwrap();

        let reply = outq.try_dequeue().unwrap();
        let event = outq.try_dequeue().unwrap();
        assert!(outq.try_dequeue().is_none());

        assert_eq!(
            u16::from_le_bytes(reply[16..18].try_into().unwrap()),
            msg::RPL_SURFACE_PRESENT
        );
        assert_eq!(
            u16::from_le_bytes(event[16..18].try_into().unwrap()),
            msg::EVT_SURFACE_PRESENTED
        );

        let reply_sid = decode_u32(&reply[36..40]);
        let reply_cookie = decode_u64(&reply[40..48]);
        let event_sid = decode_u32(&event[32..36]);
        let event_cookie = decode_u64(&event[40..48]);
        assert_eq!(reply_sid, 1);
        assert_eq!(event_sid, 1);
        assert_eq!(reply_cookie, 0x1111_2222_3333_4444);
        assert_eq!(event_cookie, 0x1111_2222_3333_4444);
    }

    #[test]
    fn seqno_increases_across_presents() {
        let outq = OutQueue::default();
        let mut presenter = Presenter::new();
        presenter.present(&outq, 1, 1, 1).unwrap();
        outq.try_dequeue();
        let event1 = outq.try_dequeue().unwrap();
        presenter.present(&outq, 2, 1, 2).unwrap();
        outq.try_dequeue();
        let event2 = outq.try_dequeue().unwrap();

        let seq1 = u32::from_le_bytes(event1[24..28].try_into().unwrap());
        let seq2 = u32::from_le_bytes(event2[24..28].try_into().unwrap());
        assert!(seq2 > seq1);
    }
}
