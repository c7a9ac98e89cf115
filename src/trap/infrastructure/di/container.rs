// nt_sbi/src/trap/infrastructure/di/container.rs

//! # Firmware Dependency Injection Container
//!
//! Defines the `Firmware` struct, which owns the two dispatch tables and the
//! injected platform, and routes every machine-mode trap to the right one.

use super::traits::Platform;
use crate::trap::ds::{EcallModule, SbiError, SbiResult, TrapCause, TrapContext};
use crate::trap::infrastructure::double_trap::handle_double_trap;
use crate::trap::infrastructure::ecall_manager::EcallRegistry;
use crate::trap::infrastructure::irqchip_manager::IrqchipRegistry;
use alloc::sync::Arc;
use log::{error, info};

pub struct Firmware {
    platform: Arc<dyn Platform>,
    ecall: EcallRegistry,
    irqchip: IrqchipRegistry,
    modules: &'static [EcallModule],
}

impl Firmware {
    /// Creates an empty container. Nothing is registered until `init`.
    pub fn new(platform: Arc<dyn Platform>, modules: &'static [EcallModule]) -> Self {
        Self {
            platform,
            ecall: EcallRegistry::new(),
            irqchip: IrqchipRegistry::new(),
            modules,
        }
    }

    /// Per-hart initialization.
    ///
    /// The cold-boot hart registers the extension modules, then discovers
    /// interrupt controllers. Every hart then runs the controllers' warm init.
    pub fn init(&self, cold_boot: bool) -> SbiResult<()> {
        let hart = self.platform.current_hart();
        if cold_boot {
            self.ecall.bootstrap(self.modules, &*self.platform)?;
            info!(
                "hart {}: SBI v{}.{}, extensions: {}",
                hart,
                self.ecall.version_major(),
                self.ecall.version_minor(),
                self.ecall.extensions_str(false)
            );
        }
        self.irqchip.init(cold_boot, &*self.platform).map_err(|e| {
            error!("hart {}: irqchip init failed: {}", hart, e);
            e
        })
    }

    pub fn exit(&self) {
        self.irqchip.exit(&*self.platform);
    }

    /// Routes one trap.
    ///
    /// Environment calls from S- or M-mode always succeed here; their status
    /// is delivered in `a0`. Those from U- or VS-mode are redirected through
    /// the platform. An external interrupt with no feeding controller is
    /// spurious and ignored. An error return is a trap this layer cannot
    /// recover from.
    pub fn handle_trap(&self, ctx: &mut TrapContext) -> SbiResult<()> {
        let cause = ctx.cause();
        if cause.is_interrupt() {
            return match cause.code() {
                TrapCause::MACHINE_EXTERNAL => {
                    match self.irqchip.dispatch(self.platform.current_hart()) {
                        Err(SbiError::NoDevice) => Ok(()),
                        other => other,
                    }
                }
                _ => Err(SbiError::NotSupported),
            };
        }

        match cause.code() {
            TrapCause::ECALL_FROM_S | TrapCause::ECALL_FROM_M => {
                let _ = self.ecall.dispatch(ctx);
                Ok(())
            }
            // Not ours to serve: hand it back to the less privileged context.
            TrapCause::ECALL_FROM_U | TrapCause::ECALL_FROM_VS => self.platform.redirect_trap(ctx),
            TrapCause::DOUBLE_TRAP => handle_double_trap(ctx, &*self.platform),
            _ => Err(SbiError::NotSupported),
        }
    }

    pub fn ecall(&self) -> &EcallRegistry {
        &self.ecall
    }

    pub fn irqchip(&self) -> &IrqchipRegistry {
        &self.irqchip
    }

    pub fn platform(&self) -> &dyn Platform {
        &*self.platform
    }
}
