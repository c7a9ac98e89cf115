// nt_sbi/src/trap/ds/mod.rs

//! # Trap Data Structures Module
//!
//! Defines the data structures shared by the ecall and irqchip dispatchers:
//! the trap context, hart masks, status codes, and the extension and
//! controller descriptors.

pub mod context;
pub mod ecall;
pub mod error;
pub mod hartmask;
pub mod irqchip;

pub use self::context::{PrivilegeMode, TrapCause, TrapContext, TrapInfo, TrapRegs};

pub use self::ecall::{
    extension_ids, EcallHandler, EcallModule, EcallReturn, Extension, RegisterHook,
};

pub use self::error::{SbiError, SbiResult};

pub use self::hartmask::HartMask;

pub use self::irqchip::{
    HwirqHandler, IrqChip, IrqChipOps, IrqchipDescriptor, IrqchipDriver, RawHandler,
};
