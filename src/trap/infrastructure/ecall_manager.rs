// nt_sbi/src/trap/infrastructure/ecall_manager.rs

//! # Extension Registry
//!
//! Maps an extension id (`a7`) to the one extension whose inclusive id range
//! contains it, invokes its handler, and writes the normalized result back
//! into the trapped context.
//!
//! Registration happens on the boot hart before any other hart runs; dispatch
//! only ever takes the read side of the lock, and the extension is cloned out
//! of the table before its handler is invoked.

use super::di::traits::Platform;
use crate::config::{
    DEFAULT_IMPL_ID, ECALL_INSN_LEN, SBI_SPEC_VERSION_MAJOR, SBI_SPEC_VERSION_MINOR,
};
use crate::trap::ds::{
    extension_ids, EcallModule, EcallReturn, Extension, SbiError, SbiResult, TrapContext,
};
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use log::{debug, error, warn};
use spin::RwLock;

pub struct EcallRegistry {
    extensions: RwLock<Vec<Extension>>,
    impl_id: AtomicUsize,
}

impl EcallRegistry {
    pub const fn new() -> Self {
        Self {
            extensions: RwLock::new(Vec::new()),
            impl_id: AtomicUsize::new(DEFAULT_IMPL_ID),
        }
    }

    pub fn version_major(&self) -> usize {
        SBI_SPEC_VERSION_MAJOR
    }

    pub fn version_minor(&self) -> usize {
        SBI_SPEC_VERSION_MINOR
    }

    pub fn impl_id(&self) -> usize {
        self.impl_id.load(Ordering::Relaxed)
    }

    pub fn set_impl_id(&self, id: usize) {
        self.impl_id.store(id, Ordering::Relaxed);
    }

    /// Adds an extension.
    ///
    /// Fails with `InvalidParam` if its range is inverted or overlaps a
    /// registered range. The table is unchanged on failure.
    pub fn register(&self, ext: Extension) -> SbiResult<()> {
        if ext.extid_start > ext.extid_end {
            return Err(SbiError::InvalidParam);
        }

        let mut extensions = self.extensions.write();
        if let Some(other) = extensions.iter().find(|e| e.overlaps(&ext)) {
            error!(
                "ecall: {} [{:#x}, {:#x}] overlaps {} [{:#x}, {:#x}]",
                ext.name, ext.extid_start, ext.extid_end, other.name, other.extid_start, other.extid_end
            );
            return Err(SbiError::InvalidParam);
        }

        extensions.try_reserve(1).map_err(|_| SbiError::NoMemory)?;
        debug!(
            "ecall: registered {} [{:#x}, {:#x}]",
            ext.name, ext.extid_start, ext.extid_end
        );
        extensions.push(ext);
        Ok(())
    }

    /// Removes the extension registered for exactly `[start, end]`, if any.
    pub fn unregister(&self, extid_start: usize, extid_end: usize) {
        self.extensions
            .write()
            .retain(|e| !(e.extid_start == extid_start && e.extid_end == extid_end));
    }

    pub fn find(&self, extid: usize) -> Option<Extension> {
        self.extensions.read().iter().find(|e| e.contains(extid)).cloned()
    }

    pub fn len(&self) -> usize {
        self.extensions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.read().is_empty()
    }

    /// Comma-separated names of the extensions whose experimental flag
    /// matches, in registration order, or `"none"`.
    pub fn extensions_str(&self, experimental: bool) -> String {
        let extensions = self.extensions.read();
        let mut out = String::new();
        for ext in extensions.iter().filter(|e| e.experimental == experimental) {
            if !out.is_empty() {
                out.push_str(",");
            }
            out.push_str(ext.name);
        }
        if out.is_empty() {
            out.push_str("none");
        }
        out
    }

    /// Services the environment call saved in `ctx`.
    ///
    /// Unless the handler set `skip_regs_update`, the status is validated
    /// before it reaches `a0`: internal codes, and positive values from
    /// anything but legacy console-getchar, become `Failed`. Then `mepc` is
    /// moved past the `ecall`, `a0` gets the status and, outside the legacy
    /// v0.1 family, `a1` gets the return value.
    ///
    /// Returns the status as delivered to the caller, or the handler's own
    /// status when it took over the context.
    pub fn dispatch(&self, ctx: &mut TrapContext) -> SbiResult<usize> {
        let extid = ctx.regs.a7();
        let funcid = ctx.regs.a6();
        let mut out = EcallReturn::default();

        let result = match self.find(extid) {
            Some(ext) => ext.handler.handle(self, extid, funcid, &ctx.regs, &mut out),
            None => Err(SbiError::NotSupported),
        };

        let mut status = match result {
            Ok(value) => value as isize,
            Err(e) => e.code(),
        };

        if !out.skip_regs_update {
            if status < SbiError::LAST_ARCHITECTED.code()
                || (extid != extension_ids::LEGACY_CONSOLE_GETCHAR && status > 0)
            {
                warn!(
                    "ecall: invalid status {} for ext={:#x} func={:#x}",
                    status, extid, funcid
                );
                status = SbiError::Failed.code();
            }
            ctx.regs.advance_mepc(ECALL_INSN_LEN);
            ctx.regs.set_a0(status as usize);
            if !extension_ids::is_legacy(extid) {
                ctx.regs.set_a1(out.value);
            }
        }

        match SbiError::from_code(status) {
            Some(e) => Err(e),
            None => Ok(status as usize),
        }
    }

    /// Runs the register hook of every module, in table order.
    ///
    /// A module without a hook aborts with `NoDevice`; the first failing hook
    /// aborts with its error.
    pub fn bootstrap(&self, modules: &[EcallModule], platform: &dyn Platform) -> SbiResult<()> {
        for module in modules {
            let hook = module.register_extensions.ok_or_else(|| {
                error!("ecall: module {} has no register hook", module.name);
                SbiError::NoDevice
            })?;
            hook(self, platform).map_err(|e| {
                error!("ecall: module {} failed to register: {}", module.name, e);
                e
            })?;
        }
        Ok(())
    }
}

impl Default for EcallRegistry {
    fn default() -> Self {
        Self::new()
    }
}
