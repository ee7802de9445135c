//! Per-session surface table: id allocation, pixel-memory ownership,
//! and the per-surface and per-session capacity limits placed on
//! them.

use std::collections::HashMap;
use std::sync::Arc;

use drawfs_abi::wire::FORMAT_XRGB8888;
use drawfs_lib::DrawFsError;
use drawfs_mm::SurfaceMemory;

/// Default upper bound on one surface's pixel byte count (64 MiB).
pub const DEFAULT_MAX_SURFACE_BYTES: u64 = 64 * 1024 * 1024;
/// Default upper bound on the number of live surfaces in one session.
pub const DEFAULT_MAX_SURFACES_PER_SESSION: usize = 256;

/// One off-screen pixel surface. Owned by exactly one `SurfaceTable`
/// entry; `pixels` may additionally be held by zero or more live
/// client mappings via their own `Arc` clone, which is why the table
/// holds a reference rather than the buffer itself.
#[derive(Clone, Debug)]
pub struct Surface {
    pub id: u32,
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub stride: u32,
    pub total_bytes: u32,
    pub pixels: Arc<SurfaceMemory>,
}

/// Bounded map from session-local surface id to `Surface`. Ids are
/// assigned 1, 2, 3, … and never reused, even after the surface they
/// named is destroyed.
pub struct SurfaceTable {
    surfaces: HashMap<u32, Surface>,
    next_id: u32,
    max_surface_bytes: u64,
    max_surfaces_per_session: usize,
}

impl SurfaceTable {
    pub fn new(max_surface_bytes: u64, max_surfaces_per_session: usize) -> Self {
        Self {
            surfaces: HashMap::new(),
            next_id: 1,
            max_surface_bytes,
            max_surfaces_per_session,
        }
    }

    /// Validate and allocate a new surface, zero-filled at creation.
    pub fn create(&mut self, width: u32, height: u32, format: u32) -> Result<Surface, DrawFsError> {
        if format != FORMAT_XRGB8888 {
            return Err(DrawFsError::UnsupportedFormat(format));
        }

        let stride = (width as u64)
            .checked_mul(4)
            .ok_or(DrawFsError::SurfaceTooLarge { width, height })?;
        let total_bytes = stride
            .checked_mul(height as u64)
            .ok_or(DrawFsError::SurfaceTooLarge { width, height })?;
        if total_bytes > self.max_surface_bytes {
            return Err(DrawFsError::SurfaceTooLarge { width, height });
        }

        if self.surfaces.len() >= self.max_surfaces_per_session {
            return Err(DrawFsError::SurfaceTableFull);
        }

        let pixels = SurfaceMemory::new(total_bytes as usize).map_err(DrawFsError::MapFailed)?;
        let id = self.next_id;
        self.next_id += 1;

        let surface = Surface {
            id,
            width,
            height,
            format,
            stride: stride as u32,
            total_bytes: total_bytes as u32,
            pixels,
        };
        self.surfaces.insert(id, surface.clone());
        Ok(surface)
    }

    /// Remove and drop the table's reference to a surface's pixels.
    /// Live client mappings of the same `SurfaceMemory` (via their own
    /// `Arc` clone) keep the region alive past this call.
    pub fn destroy(&mut self, sid: u32) -> Result<(), DrawFsError> {
        self.surfaces
            .remove(&sid)
            .map(|_| ())
            .ok_or(DrawFsError::UnknownSurface(sid))
    }

    pub fn get(&self, sid: u32) -> Option<&Surface> {
        self.surfaces.get(&sid)
    }

    pub fn contains(&self, sid: u32) -> bool {
        self.surfaces.contains_key(&sid)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// All surface ids, for teardown (free every pixel buffer on
    /// session close).
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.surfaces.keys().copied()
    }
}

impl Default for SurfaceTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SURFACE_BYTES, DEFAULT_MAX_SURFACES_PER_SESSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut table = SurfaceTable::default();
        let a = table.create(4, 4, FORMAT_XRGB8888).unwrap();
        let b = table.create(4, 4, FORMAT_XRGB8888).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn stride_and_total_match_known_dimensions() {
        let mut table = SurfaceTable::default();
        let s = table.create(320, 240, FORMAT_XRGB8888).unwrap();
        assert_eq!(s.stride, 1280);
        assert_eq!(s.total_bytes, 307_200);
    }

    #[test]
    fn destroy_then_lookup_is_enoent() {
        let mut table = SurfaceTable::default();
        let s = table.create(4, 4, FORMAT_XRGB8888).unwrap();
        table.destroy(s.id).unwrap();
        assert!(matches!(
            table.destroy(s.id),
            Err(DrawFsError::UnknownSurface(_))
        ));
    }

    #[test]
    fn destroyed_id_never_reused() {
        let mut table = SurfaceTable::default();
        let a = table.create(4, 4, FORMAT_XRGB8888).unwrap();
        table.destroy(a.id).unwrap();
        let b = table.create(4, 4, FORMAT_XRGB8888).unwrap();
        assert_eq!(b.id, 2);
    }

    #[test]
    fn oversized_surface_is_efbig() {
        let mut table = SurfaceTable::default();
        let err = table.create(4096, 4097, FORMAT_XRGB8888).unwrap_err();
        assert!(matches!(err, DrawFsError::SurfaceTooLarge { .. }));
        assert_eq!(err.to_errno(), drawfs_abi::Errno::EFBIG);
    }

    #[test]
    fn unsupported_format_is_eprotonosupport() {
        let mut table = SurfaceTable::default();
        let err = table.create(64, 64, 999).unwrap_err();
        assert_eq!(err.to_errno(), drawfs_abi::Errno::EPROTONOSUPPORT);
    }

    #[test]
    fn capacity_overflow_is_enospc() {
        let mut table = SurfaceTable::default();
        for _ in 0..DEFAULT_MAX_SURFACES_PER_SESSION {
            table.create(1, 1, FORMAT_XRGB8888).unwrap();
        }
        let err = table.create(1, 1, FORMAT_XRGB8888).unwrap_err();
        assert_eq!(err.to_errno(), drawfs_abi::Errno::ENOSPC);
    }

    #[test]
    fn oversized_request_at_full_capacity_is_still_efbig() {
        let mut table = SurfaceTable::default();
        for _ in 0..DEFAULT_MAX_SURFACES_PER_SESSION {
            table.create(1, 1, FORMAT_XRGB8888).unwrap();
        }
        let err = table.create(4096, 4097, FORMAT_XRGB8888).unwrap_err();
        assert_eq!(err.to_errno(), drawfs_abi::Errno::EFBIG);
    }
}
