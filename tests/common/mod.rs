#![allow(dead_code)]

use nt_sbi::trap::{
    IrqChip, IrqChipOps, IrqchipDevice, IrqchipRegistry, Platform, SbiError, SbiResult,
    TrapContext,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Setup(u32),
    Cleanup(u32),
    Eoi(u32),
    Mask(u32),
    Unmask(u32),
}

/// Controller double that logs every hook and can fail setup on one line.
pub struct LoggingChip {
    ops: IrqChipOps,
    fail_setup_at: Option<u32>,
    log: Mutex<Vec<Hook>>,
    pending: Mutex<Vec<u32>>,
}

impl LoggingChip {
    pub fn new(ops: IrqChipOps) -> Self {
        Self {
            ops,
            fail_setup_at: None,
            log: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_setup_at(ops: IrqChipOps, hwirq: u32) -> Self {
        Self {
            fail_setup_at: Some(hwirq),
            ..Self::new(ops)
        }
    }

    pub fn log(&self) -> Vec<Hook> {
        self.log.lock().unwrap().clone()
    }

    pub fn raise(&self, hwirq: u32) {
        self.pending.lock().unwrap().push(hwirq);
    }

    /// Lines set up and not cleaned up afterwards.
    pub fn live_lines(&self) -> Vec<u32> {
        let mut live = Vec::new();
        for hook in self.log() {
            match hook {
                Hook::Setup(l) => live.push(l),
                Hook::Cleanup(l) => live.retain(|x| *x != l),
                _ => {}
            }
        }
        live
    }

    fn push(&self, hook: Hook) {
        self.log.lock().unwrap().push(hook);
    }
}

impl IrqChip for LoggingChip {
    fn ops(&self) -> IrqChipOps {
        self.ops
    }

    fn process_hwirqs(&self, dev: &IrqchipDevice) -> SbiResult<()> {
        let pending: Vec<u32> = std::mem::take(&mut *self.pending.lock().unwrap());
        for hwirq in pending {
            dev.process_hwirq(hwirq)?;
        }
        Ok(())
    }

    fn hwirq_setup(&self, hwirq: u32) -> SbiResult<()> {
        if self.fail_setup_at == Some(hwirq) {
            return Err(SbiError::Io);
        }
        self.push(Hook::Setup(hwirq));
        Ok(())
    }

    fn hwirq_cleanup(&self, hwirq: u32) {
        self.push(Hook::Cleanup(hwirq));
    }

    fn hwirq_eoi(&self, hwirq: u32) {
        self.push(Hook::Eoi(hwirq));
    }

    fn hwirq_mask(&self, hwirq: u32) {
        self.push(Hook::Mask(hwirq));
    }

    fn hwirq_unmask(&self, hwirq: u32) {
        self.push(Hook::Unmask(hwirq));
    }
}

type Discover = Box<dyn Fn(&IrqchipRegistry) -> SbiResult<()> + Send + Sync>;

/// Single-hart platform whose discovery step is supplied by the test.
pub struct BoardPlatform {
    pub hart: AtomicUsize,
    pub meie: AtomicBool,
    discover: Discover,
}

impl BoardPlatform {
    pub fn new(discover: Discover) -> Self {
        Self {
            hart: AtomicUsize::new(0),
            meie: AtomicBool::new(false),
            discover,
        }
    }

    pub fn external_irq_enabled(&self) -> bool {
        self.meie.load(Ordering::SeqCst)
    }
}

impl Platform for BoardPlatform {
    fn current_hart(&self) -> usize {
        self.hart.load(Ordering::SeqCst)
    }

    fn enable_external_irq(&self) {
        self.meie.store(true, Ordering::SeqCst);
    }

    fn disable_external_irq(&self) {
        self.meie.store(false, Ordering::SeqCst);
    }

    fn irqchip_init(&self, irqchip: &IrqchipRegistry) -> SbiResult<()> {
        (self.discover)(irqchip)
    }

    fn redirect_trap(&self, _ctx: &mut TrapContext) -> SbiResult<()> {
        Ok(())
    }
}
