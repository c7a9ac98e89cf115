// nt_sbi/src/trap/infrastructure/ecall_base.rs

//! # Base Extension
//!
//! The one extension every SBI implementation must provide: version and
//! implementation queries, extension probing, and the machine id registers.
//! It is also the default entry of the extension module table.

use super::di::traits::{MachineIds, Platform};
use super::ecall_manager::EcallRegistry;
use crate::config::IMPL_VERSION;
use crate::trap::ds::{
    extension_ids, EcallHandler, EcallModule, EcallReturn, Extension, SbiError, SbiResult,
    TrapRegs,
};
use alloc::sync::Arc;

pub const GET_SPEC_VERSION: usize = 0;
pub const GET_IMPL_ID: usize = 1;
pub const GET_IMPL_VERSION: usize = 2;
pub const PROBE_EXTENSION: usize = 3;
pub const GET_MVENDORID: usize = 4;
pub const GET_MARCHID: usize = 5;
pub const GET_MIMPID: usize = 6;

const SPEC_VERSION_MAJOR_SHIFT: usize = 24;
const SPEC_VERSION_MAJOR_MASK: usize = 0x7f;
const SPEC_VERSION_MINOR_MASK: usize = 0xff_ffff;

/// Encodes a spec version the way `GET_SPEC_VERSION` reports it.
pub const fn encode_spec_version(major: usize, minor: usize) -> usize {
    ((major & SPEC_VERSION_MAJOR_MASK) << SPEC_VERSION_MAJOR_SHIFT)
        | (minor & SPEC_VERSION_MINOR_MASK)
}

/// Machine ids are latched when the extension is registered on the boot hart.
pub struct BaseExtension {
    ids: MachineIds,
}

impl BaseExtension {
    pub fn new(ids: MachineIds) -> Self {
        Self { ids }
    }
}

impl EcallHandler for BaseExtension {
    fn handle(
        &self,
        ecall: &EcallRegistry,
        _extid: usize,
        funcid: usize,
        regs: &TrapRegs,
        out: &mut EcallReturn,
    ) -> SbiResult<usize> {
        out.value = match funcid {
            GET_SPEC_VERSION => encode_spec_version(ecall.version_major(), ecall.version_minor()),
            GET_IMPL_ID => ecall.impl_id(),
            GET_IMPL_VERSION => IMPL_VERSION,
            PROBE_EXTENSION => {
                let probed = regs.a0();
                ecall.find(probed).map_or(0, |ext| ext.handler.probe(probed))
            }
            GET_MVENDORID => self.ids.mvendorid,
            GET_MARCHID => self.ids.marchid,
            GET_MIMPID => self.ids.mimpid,
            _ => return Err(SbiError::NotSupported),
        };
        Ok(0)
    }
}

fn register_base(ecall: &EcallRegistry, platform: &dyn Platform) -> SbiResult<()> {
    let base = BaseExtension::new(platform.machine_ids());
    ecall.register(Extension::new(
        "base",
        extension_ids::BASE,
        extension_ids::BASE,
        Arc::new(base),
    ))
}

/// Extension modules linked into the firmware, in bootstrap order.
pub static DEFAULT_MODULES: &[EcallModule] = &[EcallModule {
    name: "base",
    register_extensions: Some(register_base),
}];
