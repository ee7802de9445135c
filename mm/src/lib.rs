//! Page-backed surface memory for the DrawFS protocol engine.

pub mod surface_memory;

pub use surface_memory::SurfaceMemory;
