//! Display registry, surface table, mmap arming, and the outbound
//! presentation queue for one DrawFS session.
//!
//! None of this module owns a session mutex; `drawfs-core::Session`
//! wraps one of each behind its own lock, keeping "owns the data"
//! separate from "owns the lock".

pub mod map_selector;
pub mod out_queue;
pub mod presenter;
pub mod registry;
pub mod surface_table;

pub use map_selector::MapSelector;
pub use out_queue::OutQueue;
pub use presenter::Presenter;
pub use registry::Registry;
pub use surface_table::{Surface, SurfaceTable};
