// nt_sbi/src/config.rs

//! Compile-time firmware configuration.

/// Maximum number of harts a `HartMask` can describe.
pub const MAX_HARTS: usize = 128;

/// SBI specification version implemented by the extension registry.
pub const SBI_SPEC_VERSION_MAJOR: usize = 2;
pub const SBI_SPEC_VERSION_MINOR: usize = 0;

/// SBI implementation ID reported by the Base extension until a platform overrides it.
pub const DEFAULT_IMPL_ID: usize = 1;

/// Implementation version, encoded as `major << 16 | minor`.
pub const IMPL_VERSION: usize = (0 << 16) | 1;

/// Length of the `ecall` instruction; `mepc` is advanced by this much after a call.
pub const ECALL_INSN_LEN: usize = 4;

/// Alignment applied to the firmware heap region.
pub const HEAP_ALIGN: usize = 16;
