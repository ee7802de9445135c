//! Process-wide, read-only display registry.
//!
//! Built once at server startup and handed to every `Session` by
//! reference (or by cheap clone, since it never mutates after
//! construction) — the registry needs no lock of its own.

use drawfs_abi::DisplayInfo;

/// The enumerated set of virtual displays a session may bind to via
/// `DISPLAY_OPEN`. Immutable after construction.
#[derive(Clone, Debug)]
pub struct Registry {
    displays: Vec<DisplayInfo>,
}

impl Registry {
    /// Build a registry from an explicit display list. Panics if
    /// `displays` is empty or does not contain id 1 — every server
    /// process must expose at least display 1.
    pub fn new(displays: Vec<DisplayInfo>) -> Self {
        assert!(!displays.is_empty(), "registry needs at least one display");
        assert!(
            displays.iter().any(|d| d.id == 1),
            "registry must expose display id 1"
        );
        Self { displays }
    }

    /// The default single-display registry: one 1920x1080@60 display
    /// with id 1.
    pub fn single_default() -> Self {
        Self::new(vec![DisplayInfo::new(1, 1920, 1080, 60_000)])
    }

    /// All enumerated displays, in registry order.
    pub fn displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    /// Look up a display by id.
    pub fn get(&self, id: u32) -> Option<DisplayInfo> {
        self.displays.iter().copied().find(|d| d.id == id)
    }

    /// Whether `id` names a display in this registry.
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::single_default()
    }
}
