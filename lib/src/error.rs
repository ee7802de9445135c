//! Internal error type for fallible construction paths that never
//! reach the wire (registry setup, mmap failures). Dispatch code
//! converts any `DrawFsError` arising mid-session to the nearest
//! `drawfs_abi::Errno` before a reply is built; `DrawFsError` itself
//! is never placed on the wire.

use drawfs_abi::Errno;

#[derive(Debug, thiserror::Error)]
pub enum DrawFsError {
    #[error("unknown display id {0}")]
    UnknownDisplay(u32),

    #[error("unknown surface id {0}")]
    UnknownSurface(u32),

    #[error("surface {width}x{height} exceeds the maximum surface size")]
    SurfaceTooLarge { width: u32, height: u32 },

    #[error("session already has the maximum number of surfaces")]
    SurfaceTableFull,

    #[error("unsupported pixel format {0}")]
    UnsupportedFormat(u32),

    #[error("operation requires a later session state")]
    InvalidState,

    #[error("output queue is full")]
    QueueFull,

    #[error("message or frame exceeds its size bound")]
    MessageTooLarge,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("failed to map surface memory: {0}")]
    MapFailed(#[from] std::io::Error),
}

impl DrawFsError {
    /// Map to the protocol status code a reply's `status` field
    /// carries for this failure.
    pub fn to_errno(&self) -> Errno {
        match self {
            DrawFsError::UnknownDisplay(_) | DrawFsError::UnknownSurface(_) => Errno::ENOENT,
            DrawFsError::SurfaceTooLarge { .. } => Errno::EFBIG,
            DrawFsError::SurfaceTableFull | DrawFsError::QueueFull => Errno::ENOSPC,
            DrawFsError::UnsupportedFormat(_) => Errno::EPROTONOSUPPORT,
            DrawFsError::MessageTooLarge => Errno::EMSGSIZE,
            DrawFsError::InvalidState
            | DrawFsError::InvalidArgument(_)
            | DrawFsError::MapFailed(_) => Errno::EINVAL,
        }
    }
}
