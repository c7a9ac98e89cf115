// nt_sbi/src/trap/infrastructure/test_support.rs

//! Recording controller and platform doubles shared by the unit tests.

use super::di::traits::{MachineIds, Platform};
use super::irqchip_device::IrqchipDevice;
use super::irqchip_manager::IrqchipRegistry;
use crate::trap::ds::{IrqChip, IrqChipOps, SbiError, SbiResult, TrapContext};
use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use spin::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipEvent {
    WarmInit,
    Process,
    Setup(u32),
    Cleanup(u32),
    Eoi(u32),
    Mask(u32),
    Unmask(u32),
}

pub struct MockChip {
    ops: IrqChipOps,
    events: Mutex<Vec<ChipEvent>>,
    set_up: Mutex<BTreeSet<u32>>,
    pending: Mutex<Vec<u32>>,
    fail_setup_at: Option<u32>,
    fail_warm_init: bool,
}

impl MockChip {
    pub fn with_ops(ops: IrqChipOps) -> Self {
        Self {
            ops,
            events: Mutex::new(Vec::new()),
            set_up: Mutex::new(BTreeSet::new()),
            pending: Mutex::new(Vec::new()),
            fail_setup_at: None,
            fail_warm_init: false,
        }
    }

    /// Every hook, including `PROCESS_HWIRQS`.
    pub fn full() -> Self {
        Self::with_ops(IrqChipOps::all())
    }

    /// Every hook except `PROCESS_HWIRQS`.
    pub fn passive() -> Self {
        Self::with_ops(IrqChipOps::all().difference(IrqChipOps::PROCESS_HWIRQS))
    }

    pub fn fail_setup_at(mut self, hwirq: u32) -> Self {
        self.fail_setup_at = Some(hwirq);
        self
    }

    pub fn fail_warm_init(mut self) -> Self {
        self.fail_warm_init = true;
        self
    }

    pub fn events(&self) -> Vec<ChipEvent> {
        self.events.lock().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Lines set up and not yet cleaned up.
    pub fn set_up_lines(&self) -> Vec<u32> {
        self.set_up.lock().iter().copied().collect()
    }

    /// Marks a line pending for the next `process_hwirqs`.
    pub fn raise(&self, hwirq: u32) {
        self.pending.lock().push(hwirq);
    }

    fn record(&self, event: ChipEvent) {
        self.events.lock().push(event);
    }
}

impl IrqChip for MockChip {
    fn ops(&self) -> IrqChipOps {
        self.ops
    }

    fn warm_init(&self, _dev: &IrqchipDevice) -> SbiResult<()> {
        if self.fail_warm_init {
            return Err(SbiError::Failed);
        }
        self.record(ChipEvent::WarmInit);
        Ok(())
    }

    fn process_hwirqs(&self, dev: &IrqchipDevice) -> SbiResult<()> {
        self.record(ChipEvent::Process);
        let pending: Vec<u32> = core::mem::take(&mut *self.pending.lock());
        for hwirq in pending {
            dev.process_hwirq(hwirq)?;
        }
        Ok(())
    }

    fn hwirq_setup(&self, hwirq: u32) -> SbiResult<()> {
        self.record(ChipEvent::Setup(hwirq));
        if self.fail_setup_at == Some(hwirq) {
            return Err(SbiError::Io);
        }
        self.set_up.lock().insert(hwirq);
        Ok(())
    }

    fn hwirq_cleanup(&self, hwirq: u32) {
        self.record(ChipEvent::Cleanup(hwirq));
        self.set_up.lock().remove(&hwirq);
    }

    fn hwirq_eoi(&self, hwirq: u32) {
        self.record(ChipEvent::Eoi(hwirq));
    }

    fn hwirq_mask(&self, hwirq: u32) {
        self.record(ChipEvent::Mask(hwirq));
    }

    fn hwirq_unmask(&self, hwirq: u32) {
        self.record(ChipEvent::Unmask(hwirq));
    }
}

type DiscoverFn = Box<dyn Fn(&IrqchipRegistry) -> SbiResult<()> + Send + Sync>;

pub struct MockPlatform {
    hart: AtomicUsize,
    meie: AtomicBool,
    toggles: AtomicUsize,
    discover: Mutex<Option<DiscoverFn>>,
    discover_calls: AtomicUsize,
    redirects: AtomicUsize,
}

impl MockPlatform {
    pub fn new(hart: usize) -> Self {
        Self {
            hart: AtomicUsize::new(hart),
            meie: AtomicBool::new(false),
            toggles: AtomicUsize::new(0),
            discover: Mutex::new(None),
            discover_calls: AtomicUsize::new(0),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn set_hart(&self, hart: usize) {
        self.hart.store(hart, Ordering::SeqCst);
    }

    pub fn on_discover<F>(&self, f: F)
    where
        F: Fn(&IrqchipRegistry) -> SbiResult<()> + Send + Sync + 'static,
    {
        *self.discover.lock() = Some(Box::new(f));
    }

    pub fn external_irq_enabled(&self) -> bool {
        self.meie.load(Ordering::SeqCst)
    }

    pub fn external_irq_toggles(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }

    pub fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Platform for MockPlatform {
    fn current_hart(&self) -> usize {
        self.hart.load(Ordering::SeqCst)
    }

    fn enable_external_irq(&self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
        self.meie.store(true, Ordering::SeqCst);
    }

    fn disable_external_irq(&self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
        self.meie.store(false, Ordering::SeqCst);
    }

    fn machine_ids(&self) -> MachineIds {
        MachineIds {
            mvendorid: 0x489,
            marchid: 0x2b,
            mimpid: 0x2024,
        }
    }

    fn irqchip_init(&self, irqchip: &IrqchipRegistry) -> SbiResult<()> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        match self.discover.lock().as_ref() {
            Some(f) => f(irqchip),
            None => Ok(()),
        }
    }

    fn redirect_trap(&self, _ctx: &mut TrapContext) -> SbiResult<()> {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
