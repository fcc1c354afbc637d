//! Backend abstraction for register access and interrupt routing
//!
//! The HAL never touches hardware directly. It goes through two seams the
//! owning driver fills in:
//!
//! - [`RegisterAccess`]: 32-bit register read / write. The device context
//!   holds a default (memory-mapped) accessor and may carry an override,
//!   e.g. for a virtualized or simulated backend.
//! - [`IrqController`]: mask / unmask primitives that route a group's
//!   interrupt sources to the host interrupt controller.

use std::fmt::Debug;

/// 32-bit register access to the CMIC register space.
///
/// Register access is assumed to always succeed; a bus error is a
/// hardware-fatal condition outside this layer's error model.
pub trait RegisterAccess: Debug + Send + Sync {
    /// Read the 32-bit register at `addr`
    fn read32(&self, addr: u32) -> u32;

    /// Write `value` to the 32-bit register at `addr`
    fn write32(&self, addr: u32, value: u32);

    /// Backend type for debugging
    fn access_kind(&self) -> AccessKind {
        AccessKind::Custom
    }
}

/// Host interrupt routing primitives supplied by the owning driver.
///
/// `selector` identifies which raw status register the request targets
/// (the register address masked to its low 12 bits); `mask` is the group's
/// interrupt mask already shifted into that register's bit positions.
pub trait IrqController: Debug + Send + Sync {
    /// Unmask (enable) `mask` for `(group, chan)` in register `selector`
    fn intr_unmask(&self, group: usize, chan: usize, selector: u32, mask: u32);

    /// Mask (disable) for `(group, chan)`; `mask` is what remains enabled
    fn intr_mask(&self, group: usize, chan: usize, selector: u32, mask: u32);
}

/// Register backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Memory-mapped PCIe BAR
    Mmio,

    /// In-memory register file, no hardware required
    Software,

    /// Driver-supplied accessor (hypervisor trap, remote proxy, ...)
    Custom,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mmio => write!(f, "MMIO"),
            Self::Software => write!(f, "Software (simulated registers)"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// Interrupt controller that only records requests in the trace log.
///
/// Useful when the host interrupt controller is managed elsewhere (polled
/// operation, bring-up tools).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingIrqController;

impl IrqController for TracingIrqController {
    fn intr_unmask(&self, group: usize, chan: usize, selector: u32, mask: u32) {
        tracing::debug!("unmask CMC{group} ch{chan}: selector={selector:#05x} mask={mask:#010x}");
    }

    fn intr_mask(&self, group: usize, chan: usize, selector: u32, mask: u32) {
        tracing::debug!("mask CMC{group} ch{chan}: selector={selector:#05x} mask={mask:#010x}");
    }
}
