//! Interrupt mask codec
//!
//! Each group keeps a cached 32-bit interrupt mask with one nibble per
//! local channel at its natural position. The host interrupt controller
//! does not see that word directly: it exposes three raw status registers
//! that pack groups differently.
//!
//! ```text
//! group 0            -> RAW_STAT0, mask as is
//! group > 0, q < 4   -> RAW_STAT1, mask << IRQ_MASK_SHIFT   (low half moves up)
//! group > 0, q >= 4  -> RAW_STAT2, mask >> (32 - shift)     (high half moves down)
//! ```
//!
//! Shifting the wrong way corrupts other groups' interrupts. The shift is
//! applied to the value handed to the interrupt controller only; the cache
//! always holds the unshifted (logical) mask.

use cmicx_chip::regs::irq;
use cmicx_chip::topology::IRQ_MASK_SHIFT;

use crate::device::DeviceContext;

/// Local channels below this index live in the low half of a group's mask.
pub const LOW_CHANS: usize = 4;

/// Host interrupt controller raw status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqRegister {
    /// Group 0, natural bit positions
    RawStat0,
    /// Low channels of groups above 0
    RawStat1,
    /// High channels of groups above 0
    RawStat2,
}

impl IrqRegister {
    /// Register address
    #[must_use]
    pub const fn addr(self) -> u32 {
        match self {
            Self::RawStat0 => irq::RAW_STAT0,
            Self::RawStat1 => irq::RAW_STAT1,
            Self::RawStat2 => irq::RAW_STAT2,
        }
    }

    /// Selector handed to the interrupt controller (low 12 address bits)
    #[must_use]
    pub const fn selector(self) -> u32 {
        self.addr() & irq::SELECTOR_MASK
    }
}

/// Whether a mask update enables or disables its bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskOp {
    /// OR the bits in
    Enable,
    /// AND the bits out
    Disable,
}

/// Outcome of a mask update, before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqUpdate {
    /// New cached (unshifted) group mask
    pub logical: u32,
    /// Register the update targets
    pub register: IrqRegister,
    /// Mask in the target register's bit positions
    pub physical: u32,
}

/// Select the raw status register for `(group, local)` and move
/// `logical_mask` into its bit positions.
#[must_use]
pub const fn encode(group: usize, local: usize, logical_mask: u32) -> (IrqRegister, u32) {
    if group == 0 {
        (IrqRegister::RawStat0, logical_mask)
    } else if local < LOW_CHANS {
        (IrqRegister::RawStat1, logical_mask << IRQ_MASK_SHIFT)
    } else {
        (IrqRegister::RawStat2, logical_mask >> (32 - IRQ_MASK_SHIFT))
    }
}

/// Compute the update for `bits` against the cached mask `current`.
#[must_use]
pub const fn plan(current: u32, group: usize, local: usize, bits: u32, op: MaskOp) -> IrqUpdate {
    let logical = match op {
        MaskOp::Enable => current | bits,
        MaskOp::Disable => current & !bits,
    };
    let (register, physical) = encode(group, local, logical);
    IrqUpdate {
        logical,
        register,
        physical,
    }
}

/// Enable interrupt `bits` of local channel `local` in group `group`.
///
/// Updates the cached group mask and asks the owning driver's interrupt
/// controller to unmask. Callers keep `local` and `bits` within the
/// group's nibble layout; nothing is range-checked here.
///
/// # Panics
///
/// Panics if `group` is not a group of this device.
pub fn intr_enable(dev: &mut DeviceContext, group: usize, local: usize, bits: u32) {
    update(dev, group, local, bits, MaskOp::Enable);
}

/// Disable interrupt `bits` of local channel `local` in group `group`.
///
/// # Panics
///
/// Panics if `group` is not a group of this device.
pub fn intr_disable(dev: &mut DeviceContext, group: usize, local: usize, bits: u32) {
    update(dev, group, local, bits, MaskOp::Disable);
}

fn update(dev: &mut DeviceContext, group: usize, local: usize, bits: u32, op: MaskOp) {
    let u = plan(dev.groups[group].irq_mask, group, local, bits, op);
    dev.groups[group].irq_mask = u.logical;

    tracing::trace!(
        "CMC{group} ch{local} {op:?} {bits:#010x}: cache={:#010x} {:?}={:#010x}",
        u.logical,
        u.register,
        u.physical
    );

    let irq = dev.irq_controller();
    match op {
        MaskOp::Enable => irq.intr_unmask(group, local, u.register.selector(), u.physical),
        MaskOp::Disable => irq.intr_mask(group, local, u.register.selector(), u.physical),
    }
}
