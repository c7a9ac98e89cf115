// nt_sbi/src/trap/ds/irqchip.rs

//! # Interrupt Controller Definitions
//!
//! The contract between the irqchip registry and the platform drivers that
//! implement concrete controllers, and between the registry and the higher
//! level drivers that claim hardware interrupt lines.

use super::error::{SbiError, SbiResult};
use super::hartmask::HartMask;
use crate::trap::infrastructure::irqchip_device::IrqchipDevice;
use alloc::sync::Arc;
use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// Optional controller operations a driver implements.
    ///
    /// The registry only calls a hook whose flag is set; an absent hook is a
    /// no-op, never an error.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqChipOps: u32 {
        const WARM_INIT = 1 << 0;
        /// The controller feeds external interrupts to its target harts.
        const PROCESS_HWIRQS = 1 << 1;
        const HWIRQ_SETUP = 1 << 2;
        const HWIRQ_CLEANUP = 1 << 3;
        const HWIRQ_EOI = 1 << 4;
        const HWIRQ_MASK = 1 << 5;
        const HWIRQ_UNMASK = 1 << 6;
    }
}

/// A hardware interrupt controller driver.
pub trait IrqChip: Send + Sync {
    /// Which of the optional hooks below are implemented.
    fn ops(&self) -> IrqChipOps;

    /// Initializes per-hart controller state on the calling hart.
    fn warm_init(&self, _dev: &IrqchipDevice) -> SbiResult<()> {
        Ok(())
    }

    /// Reads pending lines from the controller and calls
    /// [`IrqchipDevice::process_hwirq`] for each of them.
    fn process_hwirqs(&self, _dev: &IrqchipDevice) -> SbiResult<()> {
        Err(SbiError::NotSupported)
    }

    fn hwirq_setup(&self, _hwirq: u32) -> SbiResult<()> {
        Ok(())
    }

    fn hwirq_cleanup(&self, _hwirq: u32) {}

    fn hwirq_eoi(&self, _hwirq: u32) {}

    fn hwirq_mask(&self, _hwirq: u32) {}

    fn hwirq_unmask(&self, _hwirq: u32) {}
}

/// A driver callback bound to a range of hardware interrupt lines.
///
/// Any context the callback needs is owned by the implementor.
pub trait HwirqHandler: Send + Sync {
    fn handle(&self, hwirq: u32) -> SbiResult<()>;
}

impl<F> HwirqHandler for F
where
    F: Fn(u32) -> SbiResult<()> + Send + Sync,
{
    fn handle(&self, hwirq: u32) -> SbiResult<()> {
        self(hwirq)
    }
}

/// Per-line entry point invoked by [`IrqchipDevice::process_hwirq`].
pub type RawHandler = fn(&IrqchipDevice, u32) -> SbiResult<()>;

/// What a driver hands to the registry when adding a controller.
#[derive(Clone)]
pub struct IrqchipDescriptor {
    /// Unique ID of this controller.
    pub id: u32,
    /// Number of hardware interrupt lines.
    pub num_hwirq: u32,
    /// Harts this controller targets.
    pub target_harts: HartMask,
    pub chip: Arc<dyn IrqChip>,
}

impl fmt::Debug for IrqchipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqchipDescriptor")
            .field("id", &self.id)
            .field("num_hwirq", &self.num_hwirq)
            .field("target_harts", &self.target_harts)
            .field("ops", &self.chip.ops())
            .finish()
    }
}

/// Entry of a platform's controller driver table, see
/// [`probe_drivers`](crate::trap::infrastructure::irqchip_manager::probe_drivers).
#[derive(Clone, Copy)]
pub struct IrqchipDriver {
    pub name: &'static str,
    /// Discovers matching controllers and adds them to the registry.
    /// Returns `NoDevice` when nothing matches.
    pub probe: fn(&crate::trap::infrastructure::irqchip_manager::IrqchipRegistry) -> SbiResult<()>,
}
