// nt_sbi/src/lib.rs

//! Machine-mode trap routing for a RISC-V SBI firmware.
//!
//! The crate owns the two tables every SBI implementation dispatches through:
//! the extension registry that services the supervisor's `ecall`s, and the
//! interrupt controller registry that routes machine external interrupts to
//! the drivers that claimed each hardware line. A platform plugs in through
//! [`trap::Platform`] and brings the firmware up with
//! [`trap::initialize_firmware`] followed by [`trap::init_hart`] on each hart.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod console;
pub mod heap;
pub mod selftest;
pub mod trap;

/// Firmware heap, backed by the region the platform hands to `HEAP.init`.
#[cfg(all(target_os = "none", not(test)))]
#[global_allocator]
pub static HEAP: heap::FirmwareHeap = heap::FirmwareHeap::empty();

#[cfg(all(target_os = "none", not(test)))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    log::error!("firmware panic: {}", info);
    if trap::is_initialized() {
        let _ = trap::exit_hart();
    }
    loop {
        core::hint::spin_loop();
    }
}
