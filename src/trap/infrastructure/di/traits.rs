// nt_sbi/src/trap/infrastructure/di/traits.rs

//! # Dependency Injection Traits
//!
//! The collaborators the firmware core consumes but does not implement:
//! hart identity and CSR control, controller discovery, and the trap
//! redirection primitive. A platform provides one object implementing
//! [`Platform`] and hands it to the container.

use crate::trap::ds::{SbiResult, TrapContext};
use crate::trap::infrastructure::irqchip_manager::IrqchipRegistry;
use crate::trap::infrastructure::low_level;

/// Machine identification registers reported by the Base extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MachineIds {
    pub mvendorid: usize,
    pub marchid: usize,
    pub mimpid: usize,
}

/// Interface for platform-specific services.
///
/// The hart-control methods default to the RISC-V CSRs of the calling hart.
pub trait Platform: Send + Sync {
    /// Index of the calling hart.
    fn current_hart(&self) -> usize {
        low_level::current_hart()
    }

    /// Sets `mie.MEIE` on the calling hart.
    fn enable_external_irq(&self) {
        low_level::enable_external_irq();
    }

    /// Clears `mie.MEIE` on the calling hart.
    fn disable_external_irq(&self) {
        low_level::disable_external_irq();
    }

    fn machine_ids(&self) -> MachineIds {
        low_level::machine_ids()
    }

    /// Cold-boot controller discovery: probes the hardware and adds every
    /// controller found to `irqchip`. A failure stops firmware initialization.
    fn irqchip_init(&self, irqchip: &IrqchipRegistry) -> SbiResult<()>;

    /// Re-injects the trap described by `ctx` into the less privileged
    /// context it came from.
    fn redirect_trap(&self, ctx: &mut TrapContext) -> SbiResult<()>;
}
