// nt_sbi/src/trap/api.rs

//! # Public API for the Trap Subsystem
//!
//! Provides a stable, unified interface over the global firmware instance:
//! per-hart lifecycle, trap routing, extension registration and the driver
//! attach/detach surface for interrupt lines.
//!
//! Every call fails with `InvalidState` before `initialize_firmware`.

use crate::trap::ds::{Extension, HwirqHandler, IrqchipDescriptor, SbiError, SbiResult, TrapContext};
use crate::trap::infrastructure::di::{self, with_firmware};
use crate::trap::infrastructure::irqchip_device::IrqchipDevice;
use alloc::sync::Arc;

/// Initializes the calling hart. See `Firmware::init`.
pub fn init_hart(cold_boot: bool) -> SbiResult<()> {
    with_firmware(|fw| fw.init(cold_boot))?
}

/// Tears down the calling hart's external interrupt state.
pub fn exit_hart() -> SbiResult<()> {
    with_firmware(|fw| fw.exit())
}

/// Routes one machine-mode trap. An error is unrecoverable for the hart.
pub fn handle_trap(ctx: &mut TrapContext) -> SbiResult<()> {
    di::dispatch_trap(ctx)
}

// --- Extension registry ---

pub fn register_extension(ext: Extension) -> SbiResult<()> {
    with_firmware(|fw| fw.ecall().register(ext))?
}

pub fn unregister_extension(extid_start: usize, extid_end: usize) -> SbiResult<()> {
    with_firmware(|fw| fw.ecall().unregister(extid_start, extid_end))
}

pub fn find_extension(extid: usize) -> Option<Extension> {
    with_firmware(|fw| fw.ecall().find(extid)).ok().flatten()
}

// --- Interrupt controllers ---

/// Adds a controller. Intended for the platform's discovery hook and for
/// controllers brought up after cold boot.
pub fn add_irqchip(desc: IrqchipDescriptor) -> SbiResult<Arc<IrqchipDevice>> {
    with_firmware(|fw| fw.irqchip().add_device(desc))?
}

pub fn find_irqchip(id: u32) -> Option<Arc<IrqchipDevice>> {
    with_firmware(|fw| fw.irqchip().find_device(id)).ok().flatten()
}

fn irqchip(id: u32) -> SbiResult<Arc<IrqchipDevice>> {
    with_firmware(|fw| fw.irqchip().find_device(id))?.ok_or(SbiError::NotFound)
}

/// Claims lines `[first_hwirq, first_hwirq + num_hwirq)` of controller `chip_id`.
///
/// Fails with `NotFound` if no such controller exists, otherwise as
/// `IrqchipDevice::register_handler`.
pub fn register_hwirq_handler(
    chip_id: u32,
    first_hwirq: u32,
    num_hwirq: u32,
    handler: Arc<dyn HwirqHandler>,
) -> SbiResult<()> {
    irqchip(chip_id)?.register_handler(first_hwirq, num_hwirq, handler)
}

/// Releases lines previously claimed with exactly the same interval.
pub fn unregister_hwirq_handler(chip_id: u32, first_hwirq: u32, num_hwirq: u32) -> SbiResult<()> {
    irqchip(chip_id)?.unregister_handler(first_hwirq, num_hwirq)
}

pub fn mask_hwirq(chip_id: u32, hwirq: u32) -> SbiResult<()> {
    irqchip(chip_id)?.mask_hwirq(hwirq)
}

pub fn unmask_hwirq(chip_id: u32, hwirq: u32) -> SbiResult<()> {
    irqchip(chip_id)?.unmask_hwirq(hwirq)
}
