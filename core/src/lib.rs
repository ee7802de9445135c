//! Frame/message codec and per-session DrawFS state machine.

pub mod codec;
pub mod session;

pub use codec::{Codec, DecodedMessage, FrameDecodeError};
pub use session::{Session, SessionState};
