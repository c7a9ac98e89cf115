// nt_sbi/src/trap/mod.rs

//! # RISC-V Machine-Mode Trap Routing
//!
//! The supervisor's SBI calls and the platform's external interrupts both
//! arrive here as machine-mode traps. This module owns the tables they are
//! dispatched through and the container that holds those tables for the
//! lifetime of the firmware.

pub mod ds;
pub mod infrastructure;
mod api;

// Publicly re-export the entire API module.
pub use self::api::*;

pub use self::ds::{
    extension_ids, EcallHandler, EcallModule, EcallReturn, Extension, RegisterHook, // Extensions
    HwirqHandler, IrqChip, IrqChipOps, IrqchipDescriptor, IrqchipDriver, RawHandler, // Controllers
    HartMask, PrivilegeMode, TrapCause, TrapContext, TrapInfo, TrapRegs,
    SbiError, SbiResult,
};

pub use self::infrastructure::di::container::Firmware;
pub use self::infrastructure::di::traits::{MachineIds, Platform};
pub use self::infrastructure::di::{initialize_firmware, is_initialized, with_firmware};
pub use self::infrastructure::ecall_base::DEFAULT_MODULES;
pub use self::infrastructure::ecall_manager::EcallRegistry;
pub use self::infrastructure::irqchip_device::{raw_handler_default, IrqchipDevice};
pub use self::infrastructure::irqchip_manager::{probe_drivers, IrqchipRegistry};
