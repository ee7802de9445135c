//! Runtime configuration for a device instance: the enumerated
//! display list plus the capacity bounds every session is held to.
//! Constructed once by the host binary (defaults matching the
//! documented bounds) and threaded down into `Registry`,
//! `SurfaceTable`, `OutQueue`, and `Session` construction so none of
//! them hardcode a limit a deployment can't override.

use drawfs_abi::DisplayInfo;

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub displays: Vec<DisplayInfo>,
    /// Upper bound on one surface's pixel byte count.
    pub max_surface_bytes: u64,
    /// Upper bound on the number of live surfaces in one session.
    pub max_surfaces_per_session: usize,
    /// Outbound queue depth limit.
    pub max_outq_depth: usize,
    /// Outbound queue aggregate byte limit.
    pub max_outq_bytes: usize,
    /// Upper bound on one session's inbound (not-yet-framed) byte buffer.
    pub max_inbuf: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            displays: vec![DisplayInfo::new(1, 1920, 1080, 60_000)],
            max_surface_bytes: 64 * 1024 * 1024,
            max_surfaces_per_session: 256,
            max_outq_depth: 256,
            max_outq_bytes: 256 * 1024,
            max_inbuf: 64 * 1024,
        }
    }
}
