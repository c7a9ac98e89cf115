// nt_sbi/src/trap/infrastructure/di/mod.rs

//! # Dependency Injection System - Global Access and Initialization
//!
//! Manages the global instance of the `Firmware` container and provides safe
//! mechanisms for its initialization and access.

pub mod container;
pub mod traits;

use self::container::Firmware;
use self::traits::Platform;
use crate::trap::ds::{EcallModule, SbiError, SbiResult, TrapContext};
use alloc::sync::Arc;
use spin::Once;

/// The global `Firmware` instance. Written once by the cold-boot hart,
/// read-only afterwards.
static FIRMWARE: Once<Firmware> = Once::new();

/// Creates the global firmware container.
///
/// Must be called once, on the cold-boot hart, before any other hart is
/// released. A second call fails with `AlreadyAvailable` and leaves the first
/// instance in place.
pub fn initialize_firmware(
    platform: Arc<dyn Platform>,
    modules: &'static [EcallModule],
) -> SbiResult<&'static Firmware> {
    let mut created = false;
    let firmware = FIRMWARE.call_once(|| {
        created = true;
        Firmware::new(platform, modules)
    });
    if !created {
        return Err(SbiError::AlreadyAvailable);
    }
    Ok(firmware)
}

/// Runs `f` against the global firmware, or fails with `InvalidState` if it
/// has not been created yet.
pub fn with_firmware<F, R>(f: F) -> SbiResult<R>
where
    F: FnOnce(&Firmware) -> R,
{
    FIRMWARE.get().map(f).ok_or(SbiError::InvalidState)
}

pub fn is_initialized() -> bool {
    FIRMWARE.is_completed()
}

/// Routes a trap through the global firmware.
pub fn dispatch_trap(ctx: &mut TrapContext) -> SbiResult<()> {
    with_firmware(|fw| fw.handle_trap(ctx))?
}
