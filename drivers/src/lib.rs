//! Device facade: open/read/write/ioctl/mmap/poll entry points routed
//! to the `Session` that owns the calling handle.

pub mod device;

pub use device::{ControlOp, Device, Handle, IoctlResult};
