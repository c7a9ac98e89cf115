// nt_sbi/src/trap/infrastructure/low_level.rs

//! # Low-Level Hart Control
//!
//! Direct access to the machine-mode CSRs this layer touches, and the
//! C-callable bridge the trap entry code calls into. Off RISC-V (host builds
//! and tests) the CSR accessors degrade to a single hart 0 with no side effects.

use super::di::traits::MachineIds;
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
use core::arch::asm;

/// Reads `mhartid`.
#[inline]
pub fn current_hart() -> usize {
    #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
    {
        riscv::register::mhartid::read()
    }
    #[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
    {
        0
    }
}

/// Sets the machine external interrupt enable bit.
#[inline]
pub fn enable_external_irq() {
    #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
    unsafe {
        riscv::register::mie::set_mext();
    }
}

/// Clears the machine external interrupt enable bit.
#[inline]
pub fn disable_external_irq() {
    #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
    unsafe {
        riscv::register::mie::clear_mext();
    }
}

/// Reads `mvendorid`, `marchid` and `mimpid`.
pub fn machine_ids() -> MachineIds {
    #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
    {
        let (mvendorid, marchid, mimpid): (usize, usize, usize);
        unsafe {
            asm!("csrr {}, mvendorid", out(reg) mvendorid);
            asm!("csrr {}, marchid", out(reg) marchid);
            asm!("csrr {}, mimpid", out(reg) mimpid);
        }
        MachineIds {
            mvendorid,
            marchid,
            mimpid,
        }
    }
    #[cfg(not(any(target_arch = "riscv32", target_arch = "riscv64")))]
    {
        MachineIds::default()
    }
}

/// Target of the `call` in the machine trap entry code.
///
/// # Safety
///
/// Must only be called from the trap entry code with a pointer to the
/// context it just saved on the trapping hart's stack.
#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
#[no_mangle]
pub unsafe extern "C" fn sbi_trap_handler(context: *mut crate::trap::ds::TrapContext) {
    let context = unsafe { &mut *context };
    if let Err(e) = super::di::dispatch_trap(context) {
        log::error!(
            "unhandled trap {:?} at mepc={:#x}: {}",
            context.cause(),
            context.regs.mepc,
            e
        );
        hang();
    }
}

#[cfg(all(any(target_arch = "riscv32", target_arch = "riscv64"), target_os = "none"))]
fn hang() -> ! {
    loop {
        unsafe { asm!("wfi") };
    }
}
