//! Ambient support utilities shared across the DrawFS crates: byte
//! alignment helpers, the internal error type, and logging setup.

pub mod alignment;
pub mod config;
pub mod error;
pub mod logging;

pub use alignment::{align_down_u64, align_up_u64};
pub use config::DeviceConfig;
pub use error::DrawFsError;
pub use logging::init_logging;
