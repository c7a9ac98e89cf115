// nt_sbi/src/trap/infrastructure/irqchip_manager.rs

//! # Irqchip Registry
//!
//! Owns every interrupt controller added by the platform and routes machine
//! external interrupts to the one controller that feeds the trapping hart.
//!
//! At most one controller with `PROCESS_HWIRQS` may target any hart. The
//! registry resolves that controller once, at `add_device` time, into a
//! per-hart slot so dispatch is a table lookup.

use super::di::traits::Platform;
use super::irqchip_device::IrqchipDevice;
use crate::config::MAX_HARTS;
use crate::trap::ds::{IrqChipOps, IrqchipDescriptor, IrqchipDriver, SbiError, SbiResult};
use alloc::sync::Arc;
use alloc::vec::Vec;
use log::{debug, error, info, trace};
use spin::RwLock;

struct IrqchipList {
    devices: Vec<Arc<IrqchipDevice>>,
    /// Index into `devices` of the controller feeding each hart.
    feeders: [Option<usize>; MAX_HARTS],
}

pub struct IrqchipRegistry {
    inner: RwLock<IrqchipList>,
}

impl IrqchipRegistry {
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(IrqchipList {
                devices: Vec::new(),
                feeders: [None; MAX_HARTS],
            }),
        }
    }

    /// Adds a controller.
    ///
    /// Fails with `InvalidParam` for a controller without lines or target
    /// harts, or for a feeding controller whose targets intersect those of
    /// another feeding controller; with `AlreadyAvailable` if the id is taken.
    /// Nothing is changed on failure.
    pub fn add_device(&self, desc: IrqchipDescriptor) -> SbiResult<Arc<IrqchipDevice>> {
        if desc.num_hwirq == 0 || desc.target_harts.weight() == 0 {
            return Err(SbiError::InvalidParam);
        }

        let mut list = self.inner.write();
        if list.devices.iter().any(|d| d.id() == desc.id) {
            return Err(SbiError::AlreadyAvailable);
        }

        let feeds = desc.chip.ops().contains(IrqChipOps::PROCESS_HWIRQS);
        if feeds {
            let clash = list
                .devices
                .iter()
                .filter(|d| d.feeds_harts())
                .any(|d| d.target_harts().intersects(&desc.target_harts));
            if clash {
                error!(
                    "irqchip {:#x}: another controller already feeds harts {:?}",
                    desc.id, desc.target_harts
                );
                return Err(SbiError::InvalidParam);
            }
        }

        let device = Arc::new(IrqchipDevice::new(desc)?);
        list.devices.try_reserve(1).map_err(|_| SbiError::NoMemory)?;
        list.devices.push(Arc::clone(&device));

        if feeds {
            let index = list.devices.len() - 1;
            for hart in device.target_harts().iter() {
                list.feeders[hart] = Some(index);
            }
        }

        info!(
            "irqchip {:#x}: {} lines, harts {:?}{}",
            device.id(),
            device.num_hwirq(),
            device.target_harts(),
            if feeds { ", feeding" } else { "" }
        );
        Ok(device)
    }

    pub fn find_device(&self, id: u32) -> Option<Arc<IrqchipDevice>> {
        self.inner.read().devices.iter().find(|d| d.id() == id).cloned()
    }

    /// Controller feeding external interrupts to `hart`, if any.
    pub fn feeder_of(&self, hart: usize) -> Option<Arc<IrqchipDevice>> {
        let list = self.inner.read();
        let index = (*list.feeders.get(hart)?)?;
        list.devices.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().devices.is_empty()
    }

    /// Handles a machine external interrupt on `hart`.
    ///
    /// `NoDevice` means no controller feeds this hart; the interrupt is
    /// spurious or the platform is unconfigured.
    pub fn dispatch(&self, hart: usize) -> SbiResult<()> {
        let device = match self.feeder_of(hart) {
            Some(device) => device,
            None => {
                trace!("hart {}: external interrupt with no feeding irqchip", hart);
                return Err(SbiError::NoDevice);
            }
        };
        device.chip().process_hwirqs(&device)
    }

    /// Per-hart initialization.
    ///
    /// On cold boot the platform discovery hook runs first. Every controller
    /// targeting the calling hart then gets its `warm_init`; external
    /// interrupts are enabled last, once all of them succeeded.
    pub fn init(&self, cold_boot: bool, platform: &dyn Platform) -> SbiResult<()> {
        if cold_boot {
            platform.irqchip_init(self).map_err(|e| {
                error!("irqchip: platform discovery failed: {}", e);
                e
            })?;
        }

        let hart = platform.current_hart();
        let devices: Vec<Arc<IrqchipDevice>> = self.inner.read().devices.clone();
        for device in devices.iter() {
            if !device.ops().contains(IrqChipOps::WARM_INIT) {
                continue;
            }
            if !device.target_harts().test(hart) {
                continue;
            }
            device.chip().warm_init(device)?;
        }

        if devices.iter().any(|d| d.feeds_harts()) {
            platform.enable_external_irq();
            debug!("hart {}: machine external interrupts enabled", hart);
        }
        Ok(())
    }

    /// Disables machine external interrupts on the calling hart if any
    /// controller was registered.
    pub fn exit(&self, platform: &dyn Platform) {
        if !self.is_empty() {
            platform.disable_external_irq();
        }
    }
}

impl Default for IrqchipRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks a platform's controller driver table.
///
/// Drivers that find nothing report `NoDevice` and are skipped; any other
/// error stops the walk. A system without any matching controller is valid.
pub fn probe_drivers(drivers: &[IrqchipDriver], registry: &IrqchipRegistry) -> SbiResult<()> {
    for driver in drivers {
        match (driver.probe)(registry) {
            Ok(()) => debug!("irqchip driver {}: probed", driver.name),
            Err(SbiError::NoDevice) => continue,
            Err(e) => {
                error!("irqchip driver {}: probe failed: {}", driver.name, e);
                return Err(e);
            }
        }
    }
    Ok(())
}
