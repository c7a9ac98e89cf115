// nt_sbi/src/trap/ds/error.rs

//! # SBI Status Codes
//!
//! Every fallible firmware operation reports an `SbiError`. The first block of
//! variants are the statuses architected by the SBI specification and may be
//! returned verbatim to the supervisor in `a0`. The second block is private to
//! the firmware; those codes must never reach the supervisor, and the ecall
//! dispatcher clamps them to `Failed` if a handler leaks one.

use core::fmt;

/// Result type used throughout the firmware.
pub type SbiResult<T> = Result<T, SbiError>;

/// Error codes, both architected and firmware-internal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SbiError {
    Failed,
    NotSupported,
    InvalidParam,
    Denied,
    InvalidAddress,
    AlreadyAvailable,
    AlreadyStarted,
    AlreadyStopped,
    NoSharedMemory,
    InvalidState,
    BadRange,
    Timeout,
    Io,
    DeniedLocked,
    NoData,

    // Firmware-internal codes.
    NoDevice,
    NoSystem,
    NotFound,
    NoMemory,
    Unknown,
}

impl SbiError {
    /// The most negative status the supervisor may observe.
    pub const LAST_ARCHITECTED: SbiError = SbiError::NoData;

    /// Returns the register encoding of this error.
    pub const fn code(self) -> isize {
        match self {
            Self::Failed => -1,
            Self::NotSupported => -2,
            Self::InvalidParam => -3,
            Self::Denied => -4,
            Self::InvalidAddress => -5,
            Self::AlreadyAvailable => -6,
            Self::AlreadyStarted => -7,
            Self::AlreadyStopped => -8,
            Self::NoSharedMemory => -9,
            Self::InvalidState => -10,
            Self::BadRange => -11,
            Self::Timeout => -12,
            Self::Io => -13,
            Self::DeniedLocked => -14,
            Self::NoData => -15,
            Self::NoDevice => -1000,
            Self::NoSystem => -1001,
            Self::NotFound => -1002,
            Self::NoMemory => -1003,
            Self::Unknown => -1004,
        }
    }

    /// Decodes a register value. Returns `None` for success and for values
    /// that are not a known error code.
    pub fn from_code(code: isize) -> Option<Self> {
        let err = match code {
            -1 => Self::Failed,
            -2 => Self::NotSupported,
            -3 => Self::InvalidParam,
            -4 => Self::Denied,
            -5 => Self::InvalidAddress,
            -6 => Self::AlreadyAvailable,
            -7 => Self::AlreadyStarted,
            -8 => Self::AlreadyStopped,
            -9 => Self::NoSharedMemory,
            -10 => Self::InvalidState,
            -11 => Self::BadRange,
            -12 => Self::Timeout,
            -13 => Self::Io,
            -14 => Self::DeniedLocked,
            -15 => Self::NoData,
            -1000 => Self::NoDevice,
            -1001 => Self::NoSystem,
            -1002 => Self::NotFound,
            -1003 => Self::NoMemory,
            -1004 => Self::Unknown,
            _ => return None,
        };
        Some(err)
    }

    /// Whether the supervisor is allowed to observe this code.
    pub const fn is_architected(self) -> bool {
        self.code() >= Self::LAST_ARCHITECTED.code()
    }
}

impl fmt::Display for SbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Failed => "operation failed",
            Self::NotSupported => "not supported",
            Self::InvalidParam => "invalid parameter",
            Self::Denied => "denied",
            Self::InvalidAddress => "invalid address",
            Self::AlreadyAvailable => "already available",
            Self::AlreadyStarted => "already started",
            Self::AlreadyStopped => "already stopped",
            Self::NoSharedMemory => "shared memory not available",
            Self::InvalidState => "invalid state",
            Self::BadRange => "bad range",
            Self::Timeout => "timed out",
            Self::Io => "input/output error",
            Self::DeniedLocked => "denied (locked)",
            Self::NoData => "no data available",
            Self::NoDevice => "no such device",
            Self::NoSystem => "function not implemented",
            Self::NotFound => "no such entry",
            Self::NoMemory => "out of memory",
            Self::Unknown => "unknown error",
        };
        write!(f, "{} ({})", msg, self.code())
    }
}
