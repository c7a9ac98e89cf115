// nt_sbi/src/trap/infrastructure/mod.rs

//! # Trap Infrastructure Module
//!
//! The registries behind the two dispatch paths, the double-trap policy, the
//! dependency injection container that ties them to a platform, and the
//! low-level CSR layer.

// The Dependency Injection (DI) framework.
pub mod di;

// Low-level hardware interaction layer.
pub mod low_level;

// Dispatch tables.
pub mod ecall_base;
pub mod ecall_manager;
pub mod irqchip_device;
pub mod irqchip_manager;

pub mod double_trap;

#[cfg(test)]
pub(crate) mod test_support;

pub use di::initialize_firmware;
