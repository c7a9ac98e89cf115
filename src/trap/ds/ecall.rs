// nt_sbi/src/trap/ds/ecall.rs

//! # SBI Extension Definitions
//!
//! Types describing an SBI extension: its id range, its call handler, and the
//! static module table that registers extensions at cold boot.

use super::context::TrapRegs;
use super::error::SbiResult;
use crate::trap::infrastructure::di::traits::Platform;
use crate::trap::infrastructure::ecall_manager::EcallRegistry;
use alloc::sync::Arc;
use core::fmt;

/// Well-known SBI extension IDs.
pub mod extension_ids {
    pub const LEGACY_SET_TIMER: usize = 0x00;
    pub const LEGACY_CONSOLE_PUTCHAR: usize = 0x01;
    pub const LEGACY_CONSOLE_GETCHAR: usize = 0x02;
    pub const LEGACY_CLEAR_IPI: usize = 0x03;
    pub const LEGACY_SEND_IPI: usize = 0x04;
    pub const LEGACY_REMOTE_FENCE_I: usize = 0x05;
    pub const LEGACY_REMOTE_SFENCE_VMA: usize = 0x06;
    pub const LEGACY_REMOTE_SFENCE_VMA_ASID: usize = 0x07;
    pub const LEGACY_SHUTDOWN: usize = 0x08;

    pub const BASE: usize = 0x10;
    pub const TIMER: usize = 0x54494D45; // "TIME"
    pub const IPI: usize = 0x735049; // "sPI"
    pub const RFENCE: usize = 0x52464E43; // "RFNC"
    pub const HSM: usize = 0x48534D; // "HSM"
    pub const SRST: usize = 0x53525354; // "SRST"
    pub const PMU: usize = 0x504D55; // "PMU"
    pub const DBCN: usize = 0x4442434E; // "DBCN"
    pub const SUSP: usize = 0x53555350; // "SUSP"
    pub const CPPC: usize = 0x43505043; // "CPPC"
    pub const NACL: usize = 0x4E41434C; // "NACL"
    pub const STA: usize = 0x535441; // "STA"

    pub const EXPERIMENTAL_START: usize = 0x0800_0000;
    pub const EXPERIMENTAL_END: usize = 0x08FF_FFFF;
    pub const VENDOR_START: usize = 0x0900_0000;
    pub const VENDOR_END: usize = 0x09FF_FFFF;
    pub const FIRMWARE_START: usize = 0x0A00_0000;
    pub const FIRMWARE_END: usize = 0x0AFF_FFFF;

    /// Whether `extid` belongs to the legacy v0.1 call family.
    pub const fn is_legacy(extid: usize) -> bool {
        extid <= LEGACY_SHUTDOWN
    }
}

/// Output of an extension handler besides its status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EcallReturn {
    /// Value written to `a1`.
    pub value: usize,
    /// When set, the dispatcher leaves `a0`, `a1` and `mepc` untouched
    /// (the handler already redirected or rewrote the context).
    pub skip_regs_update: bool,
}

/// Handler of the calls routed to one extension.
pub trait EcallHandler: Send + Sync {
    /// Services one call.
    ///
    /// `Ok(status)` is written to `a0` as a non-negative status. Only the
    /// legacy console-getchar call may use a non-zero `Ok` status; any other
    /// positive status is treated as a handler bug and clamped to `Failed`.
    fn handle(
        &self,
        ecall: &EcallRegistry,
        extid: usize,
        funcid: usize,
        regs: &TrapRegs,
        out: &mut EcallReturn,
    ) -> SbiResult<usize>;

    /// Value reported by the Base extension's probe call.
    fn probe(&self, _extid: usize) -> usize {
        1
    }
}

impl<F> EcallHandler for F
where
    F: Fn(usize, usize, &TrapRegs, &mut EcallReturn) -> SbiResult<usize> + Send + Sync,
{
    fn handle(
        &self,
        _ecall: &EcallRegistry,
        extid: usize,
        funcid: usize,
        regs: &TrapRegs,
        out: &mut EcallReturn,
    ) -> SbiResult<usize> {
        self(extid, funcid, regs, out)
    }
}

/// A registered (or to-be-registered) SBI extension.
#[derive(Clone)]
pub struct Extension {
    pub name: &'static str,
    /// First extension id served, inclusive.
    pub extid_start: usize,
    /// Last extension id served, inclusive.
    pub extid_end: usize,
    pub experimental: bool,
    pub handler: Arc<dyn EcallHandler>,
}

impl Extension {
    pub fn new(
        name: &'static str,
        extid_start: usize,
        extid_end: usize,
        handler: Arc<dyn EcallHandler>,
    ) -> Self {
        Self {
            name,
            extid_start,
            extid_end,
            experimental: false,
            handler,
        }
    }

    /// Marks the extension as experimental.
    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    #[inline]
    pub fn contains(&self, extid: usize) -> bool {
        self.extid_start <= extid && extid <= self.extid_end
    }

    pub fn overlaps(&self, other: &Extension) -> bool {
        !(other.extid_end < self.extid_start || self.extid_end < other.extid_start)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name)
            .field("extid_start", &format_args!("{:#x}", self.extid_start))
            .field("extid_end", &format_args!("{:#x}", self.extid_end))
            .field("experimental", &self.experimental)
            .finish()
    }
}

/// Hook that registers the extensions a module provides.
pub type RegisterHook = fn(&EcallRegistry, &dyn Platform) -> SbiResult<()>;

/// One entry of the statically linked extension module table.
///
/// Bootstrap walks the table in order; a module without a hook aborts it.
#[derive(Clone, Copy)]
pub struct EcallModule {
    pub name: &'static str,
    pub register_extensions: Option<RegisterHook>,
}
