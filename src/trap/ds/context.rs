// nt_sbi/src/trap/ds/context.rs

//! # Trap Context
//!
//! The machine-mode register state saved by the trap entry path, plus the
//! decoded trap information. The ecall dispatcher mutates `a0`, `a1` and
//! `mepc` in place; everything else is read-only to this layer.

use core::fmt;

/// Register indices of the argument registers in `TrapRegs::x`.
pub mod reg {
    pub const A0: usize = 10;
    pub const A1: usize = 11;
    pub const A2: usize = 12;
    pub const A3: usize = 13;
    pub const A4: usize = 14;
    pub const A5: usize = 15;
    pub const A6: usize = 16;
    pub const A7: usize = 17;
}

const MSTATUS_MPP_SHIFT: usize = 11;
const MSTATUS_MPP_MASK: usize = 0b11 << MSTATUS_MPP_SHIFT;
#[cfg(target_pointer_width = "64")]
const MSTATUS_MPV: usize = 1 << 39;
#[cfg(target_pointer_width = "32")]
const MSTATUSH_MPV: usize = 1 << 7;

/// Privilege mode recorded in `mstatus.MPP`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(usize)]
pub enum PrivilegeMode {
    User = 0,
    Supervisor = 1,
    Machine = 3,
}

impl PrivilegeMode {
    pub fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            0 => Some(Self::User),
            1 => Some(Self::Supervisor),
            3 => Some(Self::Machine),
            _ => None,
        }
    }
}

/// Saved general purpose registers and machine status of the trapped hart.
///
/// Layout matches the save area written by the trap entry code.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapRegs {
    /// General-purpose registers x0-x31.
    pub x: [usize; 32],
    /// Machine Exception Program Counter (`mepc`).
    pub mepc: usize,
    /// Machine Status Register (`mstatus`).
    pub mstatus: usize,
    /// Upper half of `mstatus` on RV32; zero on RV64.
    pub mstatush: usize,
}

impl TrapRegs {
    #[inline]
    pub fn a(&self, n: usize) -> usize {
        self.x[reg::A0 + n]
    }

    pub fn a0(&self) -> usize {
        self.x[reg::A0]
    }

    pub fn a1(&self) -> usize {
        self.x[reg::A1]
    }

    /// Function id of an SBI call.
    pub fn a6(&self) -> usize {
        self.x[reg::A6]
    }

    /// Extension id of an SBI call.
    pub fn a7(&self) -> usize {
        self.x[reg::A7]
    }

    pub fn set_a0(&mut self, value: usize) {
        self.x[reg::A0] = value;
    }

    pub fn set_a1(&mut self, value: usize) {
        self.x[reg::A1] = value;
    }

    /// Moves `mepc` past the trapping instruction.
    pub fn advance_mepc(&mut self, len: usize) {
        self.mepc = self.mepc.wrapping_add(len);
    }

    /// Privilege mode the hart was in when it trapped.
    pub fn prev_mode(&self) -> Option<PrivilegeMode> {
        PrivilegeMode::from_bits((self.mstatus & MSTATUS_MPP_MASK) >> MSTATUS_MPP_SHIFT)
    }

    /// Whether the trap was taken from a virtualized (VS/VU) context.
    pub fn from_virt(&self) -> bool {
        #[cfg(target_pointer_width = "64")]
        {
            self.mstatus & MSTATUS_MPV != 0
        }
        #[cfg(target_pointer_width = "32")]
        {
            self.mstatush & MSTATUSH_MPV != 0
        }
    }

    /// Sets `mstatus.MPP`, and `MPV` when `virt` is set. Used by trap entry code and tests.
    pub fn set_prev_mode(&mut self, mode: PrivilegeMode, virt: bool) {
        self.mstatus = (self.mstatus & !MSTATUS_MPP_MASK) | ((mode as usize) << MSTATUS_MPP_SHIFT);
        #[cfg(target_pointer_width = "64")]
        {
            if virt {
                self.mstatus |= MSTATUS_MPV;
            } else {
                self.mstatus &= !MSTATUS_MPV;
            }
        }
        #[cfg(target_pointer_width = "32")]
        {
            if virt {
                self.mstatush |= MSTATUSH_MPV;
            } else {
                self.mstatush &= !MSTATUSH_MPV;
            }
        }
    }
}

/// A wrapper for the `mcause` register.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct TrapCause {
    bits: usize,
}

impl TrapCause {
    const INTERRUPT_BIT: usize = 1 << (usize::BITS - 1);

    /// Environment call from U-mode or VU-mode.
    pub const ECALL_FROM_U: usize = 8;
    /// Environment call from HS-mode.
    pub const ECALL_FROM_S: usize = 9;
    /// Environment call from VS-mode.
    pub const ECALL_FROM_VS: usize = 10;
    /// Environment call from M-mode.
    pub const ECALL_FROM_M: usize = 11;
    /// Double trap (Ssdbltrp).
    pub const DOUBLE_TRAP: usize = 16;
    /// Machine external interrupt.
    pub const MACHINE_EXTERNAL: usize = 11;

    pub const fn from_bits(bits: usize) -> Self {
        Self { bits }
    }

    pub const fn exception(code: usize) -> Self {
        Self { bits: code }
    }

    pub const fn interrupt(code: usize) -> Self {
        Self { bits: code | Self::INTERRUPT_BIT }
    }

    pub const fn bits(&self) -> usize {
        self.bits
    }

    pub const fn is_interrupt(&self) -> bool {
        self.bits & Self::INTERRUPT_BIT != 0
    }

    pub const fn code(&self) -> usize {
        self.bits & !Self::INTERRUPT_BIT
    }
}

impl fmt::Debug for TrapCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_interrupt() { "Interrupt" } else { "Exception" };
        write!(f, "TrapCause::{}({}, raw: {:#x})", kind, self.code(), self.bits)
    }
}

/// Decoded information about the trap being handled.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapInfo {
    pub cause: TrapCause,
    /// `mtval`
    pub tval: usize,
    /// `mtval2`, only meaningful with the hypervisor extension.
    pub tval2: usize,
    /// `mtinst`
    pub tinst: usize,
    /// Whether `tval` holds a guest virtual address.
    pub gva: bool,
}

/// Everything the trap entry path hands to the dispatchers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapContext {
    pub regs: TrapRegs,
    pub trap: TrapInfo,
}

impl TrapContext {
    pub const fn new(regs: TrapRegs, trap: TrapInfo) -> Self {
        Self { regs, trap }
    }

    pub fn cause(&self) -> TrapCause {
        self.trap.cause
    }
}
