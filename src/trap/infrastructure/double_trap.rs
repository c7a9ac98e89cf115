// nt_sbi/src/trap/infrastructure/double_trap.rs

//! # Double Trap Redirector
//!
//! Handles the double-trap exception (Ssdbltrp). Only a trap taken from
//! VS-mode has somewhere to go: it is handed back to the guest's supervisor
//! through the platform's redirection primitive.

use super::di::traits::Platform;
use crate::trap::ds::{PrivilegeMode, SbiError, SbiResult, TrapContext};
use log::warn;

/// `InvalidParam` unless the trap came from S-mode; `NotSupported` when it
/// came from HS-mode, which the caller must treat as a fatal double fault.
pub fn handle_double_trap(ctx: &mut TrapContext, platform: &dyn Platform) -> SbiResult<()> {
    if ctx.regs.prev_mode() != Some(PrivilegeMode::Supervisor) {
        return Err(SbiError::InvalidParam);
    }

    if ctx.regs.from_virt() {
        return platform.redirect_trap(ctx);
    }

    warn!(
        "double trap in HS-mode at mepc={:#x}, tval={:#x}",
        ctx.regs.mepc, ctx.trap.tval
    );
    Err(SbiError::NotSupported)
}
