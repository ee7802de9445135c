//! Per-session counters exposed via the `STATS` control operation.

/// Monotonic counters tracked for the life of a session. Field order
/// matches the `STATS` control operation's wire layout: `u64`
/// counters followed by two `u32` gauges.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames_received: u64,
    pub frames_processed: u64,
    pub frames_invalid: u64,
    pub messages_processed: u64,
    pub messages_unsupported: u64,
    pub events_enqueued: u64,
    pub events_dropped: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub evq_depth: u32,
    pub inbuf_bytes: u32,
}

impl Stats {
    pub const WIRE_SIZE: usize = 8 * 8 + 2 * 4;

    pub fn to_bytes(self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        let mut off = 0;
        macro_rules! put64 {
            ($field:expr) => {
                buf[off..off + 8].copy_from_slice(&$field.to_le_bytes());
                off += 8;
            };
        }
        put64!(self.frames_received);
        put64!(self.frames_processed);
        put64!(self.frames_invalid);
        put64!(self.messages_processed);
        put64!(self.messages_unsupported);
        put64!(self.events_enqueued);
        put64!(self.events_dropped);
        put64!(self.bytes_in);
        put64!(self.bytes_out);
        buf[off..off + 4].copy_from_slice(&self.evq_depth.to_le_bytes());
        off += 4;
        buf[off..off + 4].copy_from_slice(&self.inbuf_bytes.to_le_bytes());
        buf
    }
}
