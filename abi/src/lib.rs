//! Wire-level ABI types shared between the DrawFS device facade and its
//! clients: frame/message headers, message type codes, display
//! descriptors, and the protocol's error taxonomy.
#![no_std]
#![forbid(unsafe_code)]

pub mod display;
pub mod error;
pub mod stats;
pub mod wire;

pub use display::DisplayInfo;
pub use error::Errno;
pub use stats::Stats;
pub use wire::{FrameHeader, MsgHeader, msg};
