//! DrawFS protocol status codes.
//!
//! These are the values that travel on the wire in a reply's `status`
//! field; they reuse the platform's own errno numbering so a client
//! can treat them exactly like a syscall return value.

/// Implement common methods for protocol error enums, matching the
/// kernel's own convention for small `#[repr(i32)]` status types.
macro_rules! impl_kernel_error {
    ($ty:ty, fallback: $fallback:ident, variants: { $($val:literal => $variant:ident),* $(,)? }) => {
        impl $ty {
            /// Convert to the raw `i32` status value placed on the wire.
            #[inline]
            pub fn as_c_int(self) -> i32 {
                self as i32
            }

            /// Convert a raw wire status value back into its enum.
            #[inline]
            pub fn from_c_int(val: i32) -> Self {
                match val {
                    $($val => Self::$variant,)*
                    _ => Self::$fallback,
                }
            }

            /// Whether this is the success status (0).
            #[inline]
            pub fn is_success(self) -> bool {
                matches!(self, Self::Success)
            }
        }
    };
}

/// Protocol-level status code, placed in a reply's `status` field or
/// returned directly from a `Handle` operation.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Errno {
    #[default]
    Success = 0,
    /// Unknown display or surface id.
    ENOENT = 2,
    /// Surface too large (`total_bytes > MAX_SURFACE_BYTES`, or
    /// arithmetic overflow computing it).
    EFBIG = 27,
    /// Capacity exceeded: too many surfaces, or the output queue is full.
    ENOSPC = 28,
    /// Bad state precondition, or a programmer error such as `sid == 0`.
    EINVAL = 22,
    /// A message or frame exceeds its size bound.
    EMSGSIZE = 90,
    /// Unsupported pixel format.
    EPROTONOSUPPORT = 93,
}

impl_kernel_error!(Errno, fallback: EINVAL, variants: {
    0 => Success,
    2 => ENOENT,
    22 => EINVAL,
    27 => EFBIG,
    28 => ENOSPC,
    90 => EMSGSIZE,
    93 => EPROTONOSUPPORT,
});

impl core::fmt::Display for Errno {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Errno::Success => "Success",
            Errno::ENOENT => "ENOENT",
            Errno::EFBIG => "EFBIG",
            Errno::ENOSPC => "ENOSPC",
            Errno::EINVAL => "EINVAL",
            Errno::EMSGSIZE => "EMSGSIZE",
            Errno::EPROTONOSUPPORT => "EPROTONOSUPPORT",
        };
        write!(f, "{name}")
    }
}
