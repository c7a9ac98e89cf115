// nt_sbi/src/trap/infrastructure/irqchip_device.rs

//! # Irqchip Device
//!
//! The registry-owned record of one interrupt controller: its per-line raw
//! handler table and the chain of range-bound driver callbacks.
//!
//! Bindings on one device never overlap. Registration sets lines up before
//! unmasking them; unregistration masks and cleans lines up before the
//! binding is dropped.

use crate::trap::ds::{
    HartMask, HwirqHandler, IrqChip, IrqChipOps, IrqchipDescriptor, RawHandler, SbiError,
    SbiResult,
};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use log::{debug, warn};
use spin::RwLock;

/// A driver callback bound to `[first_hwirq, first_hwirq + num_hwirq)`.
#[derive(Clone)]
pub struct HandlerBinding {
    pub first_hwirq: u32,
    pub num_hwirq: u32,
    pub handler: Arc<dyn HwirqHandler>,
}

impl HandlerBinding {
    #[inline]
    fn contains(&self, hwirq: u32) -> bool {
        self.first_hwirq <= hwirq && hwirq - self.first_hwirq < self.num_hwirq
    }

    /// Whether this binding shares a line with `[first, first + count)`.
    fn overlaps(&self, first: u32, count: u32) -> bool {
        let end = self.first_hwirq as u64 + self.num_hwirq as u64;
        let other_end = first as u64 + count as u64;
        (self.first_hwirq as u64) < other_end && (first as u64) < end
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HandlerBinding[{}..{})",
            self.first_hwirq,
            self.first_hwirq as u64 + self.num_hwirq as u64
        )
    }
}

pub struct IrqchipDevice {
    id: u32,
    num_hwirq: u32,
    target_harts: HartMask,
    chip: Arc<dyn IrqChip>,
    ops: IrqChipOps,
    raw_handlers: RwLock<Vec<Option<RawHandler>>>,
    handlers: RwLock<Vec<HandlerBinding>>,
}

impl IrqchipDevice {
    /// Builds the device record, allocating one raw-handler slot per line,
    /// each bound to [`raw_handler_default`].
    pub(crate) fn new(desc: IrqchipDescriptor) -> SbiResult<Self> {
        let lines = desc.num_hwirq as usize;
        let mut raw_handlers = Vec::new();
        raw_handlers
            .try_reserve_exact(lines)
            .map_err(|_| SbiError::NoMemory)?;
        raw_handlers.resize(lines, Some(raw_handler_default as RawHandler));

        let ops = desc.chip.ops();
        Ok(Self {
            id: desc.id,
            num_hwirq: desc.num_hwirq,
            target_harts: desc.target_harts,
            chip: desc.chip,
            ops,
            raw_handlers: RwLock::new(raw_handlers),
            handlers: RwLock::new(Vec::new()),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn num_hwirq(&self) -> u32 {
        self.num_hwirq
    }

    pub fn target_harts(&self) -> &HartMask {
        &self.target_harts
    }

    pub fn chip(&self) -> &Arc<dyn IrqChip> {
        &self.chip
    }

    pub fn ops(&self) -> IrqChipOps {
        self.ops
    }

    /// Whether this controller feeds external interrupts to its harts.
    pub fn feeds_harts(&self) -> bool {
        self.ops.contains(IrqChipOps::PROCESS_HWIRQS)
    }

    #[inline]
    fn check_line(&self, hwirq: u32) -> SbiResult<()> {
        if hwirq >= self.num_hwirq {
            Err(SbiError::InvalidParam)
        } else {
            Ok(())
        }
    }

    /// Checks that `[first, first + count)` is a non-empty interval inside the line table.
    fn check_interval(&self, first: u32, count: u32) -> SbiResult<()> {
        if count == 0 {
            return Err(SbiError::InvalidParam);
        }
        let last = first as u64 + count as u64 - 1;
        if first >= self.num_hwirq || last >= self.num_hwirq as u64 {
            return Err(SbiError::BadRange);
        }
        Ok(())
    }

    /// Returns the binding that covers `hwirq`, if any.
    pub fn find_handler(&self, hwirq: u32) -> Option<HandlerBinding> {
        if hwirq >= self.num_hwirq {
            return None;
        }
        self.handlers.read().iter().find(|h| h.contains(hwirq)).cloned()
    }

    /// Number of active bindings.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Runs the raw handler bound to `hwirq`.
    ///
    /// Called by controller drivers from their `process_hwirqs` hook.
    pub fn process_hwirq(&self, hwirq: u32) -> SbiResult<()> {
        self.check_line(hwirq)?;
        let raw = self.raw_handlers.read()[hwirq as usize];
        match raw {
            Some(raw) => raw(self, hwirq),
            None => Err(SbiError::NotFound),
        }
    }

    /// Replaces the raw handler of one line. `None` leaves the line unrouted.
    pub fn set_raw_handler(&self, hwirq: u32, raw: Option<RawHandler>) -> SbiResult<()> {
        self.check_line(hwirq)?;
        self.raw_handlers.write()[hwirq as usize] = raw;
        Ok(())
    }

    /// Whether a raw handler is installed on `hwirq`.
    pub fn has_raw_handler(&self, hwirq: u32) -> bool {
        hwirq < self.num_hwirq && self.raw_handlers.read()[hwirq as usize].is_some()
    }

    pub fn mask_hwirq(&self, hwirq: u32) -> SbiResult<()> {
        self.check_line(hwirq)?;
        if self.ops.contains(IrqChipOps::HWIRQ_MASK) {
            self.chip.hwirq_mask(hwirq);
        }
        Ok(())
    }

    pub fn unmask_hwirq(&self, hwirq: u32) -> SbiResult<()> {
        self.check_line(hwirq)?;
        if self.ops.contains(IrqChipOps::HWIRQ_UNMASK) {
            self.chip.hwirq_unmask(hwirq);
        }
        Ok(())
    }

    /// Binds `handler` to the lines `[first_hwirq, first_hwirq + num_hwirq)`.
    ///
    /// Every line is set up before any of them is unmasked. If setup fails on
    /// one line, the lines already set up are cleaned up, the binding is
    /// dropped and the setup error is returned.
    pub fn register_handler(
        &self,
        first_hwirq: u32,
        num_hwirq: u32,
        handler: Arc<dyn HwirqHandler>,
    ) -> SbiResult<()> {
        self.check_interval(first_hwirq, num_hwirq)?;

        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| h.overlaps(first_hwirq, num_hwirq)) {
            return Err(SbiError::AlreadyAvailable);
        }
        handlers.try_reserve(1).map_err(|_| SbiError::NoMemory)?;
        handlers.push(HandlerBinding {
            first_hwirq,
            num_hwirq,
            handler,
        });

        if self.ops.contains(IrqChipOps::HWIRQ_SETUP) {
            for i in 0..num_hwirq {
                if let Err(e) = self.chip.hwirq_setup(first_hwirq + i) {
                    warn!(
                        "irqchip {:#x}: setup of hwirq {} failed: {}",
                        self.id,
                        first_hwirq + i,
                        e
                    );
                    if self.ops.contains(IrqChipOps::HWIRQ_CLEANUP) {
                        for j in 0..i {
                            self.chip.hwirq_cleanup(first_hwirq + j);
                        }
                    }
                    handlers.pop();
                    return Err(e);
                }
            }
        }

        if self.ops.contains(IrqChipOps::HWIRQ_UNMASK) {
            for i in 0..num_hwirq {
                self.chip.hwirq_unmask(first_hwirq + i);
            }
        }

        debug!(
            "irqchip {:#x}: bound hwirq [{}, {})",
            self.id,
            first_hwirq,
            first_hwirq as u64 + num_hwirq as u64
        );
        Ok(())
    }

    /// Removes the binding that covers exactly `[first_hwirq, first_hwirq + num_hwirq)`.
    /// Any other interval, valid or not, fails with `NotFound`.
    pub fn unregister_handler(&self, first_hwirq: u32, num_hwirq: u32) -> SbiResult<()> {
        let mut handlers = self.handlers.write();
        let index = handlers
            .iter()
            .position(|h| h.first_hwirq == first_hwirq && h.num_hwirq == num_hwirq)
            .ok_or(SbiError::NotFound)?;

        if self.ops.contains(IrqChipOps::HWIRQ_MASK) {
            for i in 0..num_hwirq {
                self.chip.hwirq_mask(first_hwirq + i);
            }
        }
        if self.ops.contains(IrqChipOps::HWIRQ_CLEANUP) {
            for i in 0..num_hwirq {
                self.chip.hwirq_cleanup(first_hwirq + i);
            }
        }

        handlers.remove(index);
        debug!(
            "irqchip {:#x}: released hwirq [{}, {})",
            self.id,
            first_hwirq,
            first_hwirq as u64 + num_hwirq as u64
        );
        Ok(())
    }
}

impl fmt::Debug for IrqchipDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqchipDevice")
            .field("id", &self.id)
            .field("num_hwirq", &self.num_hwirq)
            .field("target_harts", &self.target_harts)
            .field("ops", &self.ops)
            .field("handlers", &*self.handlers.read())
            .finish()
    }
}

/// Default raw handler: runs the binding that covers `hwirq`, then signals
/// end-of-interrupt whatever the callback returned.
pub fn raw_handler_default(dev: &IrqchipDevice, hwirq: u32) -> SbiResult<()> {
    dev.check_line(hwirq)?;

    // The chain lock is released before the callback runs so that it may
    // attach or detach handlers itself.
    let rc = match dev.find_handler(hwirq) {
        Some(binding) => binding.handler.handle(hwirq),
        None => {
            warn!("irqchip {:#x}: hwirq {} has no handler", dev.id, hwirq);
            Err(SbiError::NotFound)
        }
    };

    if dev.ops.contains(IrqChipOps::HWIRQ_EOI) {
        dev.chip.hwirq_eoi(hwirq);
    }

    rc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trap::infrastructure::test_support::{ChipEvent, MockChip};
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn device(chip: Arc<MockChip>, lines: u32) -> IrqchipDevice {
        IrqchipDevice::new(IrqchipDescriptor {
            id: 7,
            num_hwirq: lines,
            target_harts: HartMask::single(0),
            chip,
        })
        .unwrap()
    }

    fn ok_handler() -> Arc<dyn HwirqHandler> {
        Arc::new(|_hwirq: u32| -> SbiResult<()> { Ok(()) })
    }

    #[test]
    fn register_rejects_bad_intervals() {
        let dev = device(Arc::new(MockChip::full()), 64);
        assert_eq!(dev.register_handler(0, 0, ok_handler()), Err(SbiError::InvalidParam));
        assert_eq!(dev.register_handler(64, 1, ok_handler()), Err(SbiError::BadRange));
        assert_eq!(dev.register_handler(60, 5, ok_handler()), Err(SbiError::BadRange));
        assert_eq!(dev.register_handler(u32::MAX, 2, ok_handler()), Err(SbiError::BadRange));
        assert_eq!(dev.handler_count(), 0);
    }

    #[test]
    fn overlapping_bindings_are_rejected() {
        let dev = device(Arc::new(MockChip::full()), 64);
        dev.register_handler(4, 4, ok_handler()).unwrap();
        assert_eq!(dev.register_handler(6, 2, ok_handler()), Err(SbiError::AlreadyAvailable));
        assert_eq!(dev.register_handler(2, 3, ok_handler()), Err(SbiError::AlreadyAvailable));
        // Fully enclosing an existing binding is an overlap too.
        assert_eq!(dev.register_handler(0, 16, ok_handler()), Err(SbiError::AlreadyAvailable));
        dev.register_handler(8, 4, ok_handler()).unwrap();
        assert_eq!(dev.handler_count(), 2);
    }

    #[test]
    fn unmask_follows_setup() {
        let chip = Arc::new(MockChip::full());
        let dev = device(chip.clone(), 16);
        dev.register_handler(2, 2, ok_handler()).unwrap();
        assert_eq!(
            chip.events(),
            [
                ChipEvent::Setup(2),
                ChipEvent::Setup(3),
                ChipEvent::Unmask(2),
                ChipEvent::Unmask(3),
            ]
        );
    }

    #[test]
    fn setup_failure_rolls_back() {
        let chip = Arc::new(MockChip::full().fail_setup_at(5));
        let dev = device(chip.clone(), 16);
        assert_eq!(dev.register_handler(3, 4, ok_handler()), Err(SbiError::Io));
        assert_eq!(dev.handler_count(), 0);
        assert_eq!(
            chip.events(),
            [
                ChipEvent::Setup(3),
                ChipEvent::Setup(4),
                ChipEvent::Setup(5),
                ChipEvent::Cleanup(3),
                ChipEvent::Cleanup(4),
            ]
        );
        assert!(chip.set_up_lines().is_empty());
    }

    #[test]
    fn unregister_masks_then_cleans_up() {
        let chip = Arc::new(MockChip::full());
        let dev = device(chip.clone(), 16);
        dev.register_handler(1, 2, ok_handler()).unwrap();
        chip.clear_events();
        assert_eq!(dev.unregister_handler(1, 1), Err(SbiError::NotFound));
        assert_eq!(dev.unregister_handler(0, 3), Err(SbiError::NotFound));
        dev.unregister_handler(1, 2).unwrap();
        assert_eq!(
            chip.events(),
            [
                ChipEvent::Mask(1),
                ChipEvent::Mask(2),
                ChipEvent::Cleanup(1),
                ChipEvent::Cleanup(2),
            ]
        );
        assert_eq!(dev.handler_count(), 0);
        assert!(dev.find_handler(1).is_none());
    }

    #[test]
    fn register_unregister_round_trip() {
        let dev = device(Arc::new(MockChip::full()), 8);
        dev.register_handler(0, 8, ok_handler()).unwrap();
        dev.unregister_handler(0, 8).unwrap();
        for line in 0..8 {
            assert!(dev.has_raw_handler(line));
            assert!(dev.find_handler(line).is_none());
        }
        dev.register_handler(0, 8, ok_handler()).unwrap();
    }

    #[test]
    fn eoi_is_sent_even_when_callback_fails() {
        let chip = Arc::new(MockChip::full());
        let dev = device(chip.clone(), 8);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        dev.register_handler(
            2,
            1,
            Arc::new(move |_hwirq: u32| -> SbiResult<()> {
                seen.fetch_add(1, Ordering::SeqCst);
                Err(SbiError::Failed)
            }),
        )
        .unwrap();
        chip.clear_events();

        assert_eq!(dev.process_hwirq(2), Err(SbiError::Failed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(chip.events(), [ChipEvent::Eoi(2)]);
    }

    #[test]
    fn process_hwirq_checks_line_and_raw_handler() {
        let chip = Arc::new(MockChip::full());
        let dev = device(chip.clone(), 8);
        assert_eq!(dev.process_hwirq(8), Err(SbiError::InvalidParam));
        dev.set_raw_handler(3, None).unwrap();
        assert_eq!(dev.process_hwirq(3), Err(SbiError::NotFound));
        // Unbound line on the default handler still acknowledges the controller.
        chip.clear_events();
        assert_eq!(dev.process_hwirq(4), Err(SbiError::NotFound));
        assert_eq!(chip.events(), [ChipEvent::Eoi(4)]);
    }

    #[test]
    fn missing_hooks_are_skipped() {
        let chip = Arc::new(MockChip::with_ops(IrqChipOps::empty()));
        let dev = device(chip.clone(), 8);
        dev.register_handler(0, 4, ok_handler()).unwrap();
        dev.mask_hwirq(1).unwrap();
        assert_eq!(dev.unmask_hwirq(9), Err(SbiError::InvalidParam));
        dev.process_hwirq(1).unwrap();
        dev.unregister_handler(0, 4).unwrap();
        assert!(chip.events().is_empty());
    }
}
