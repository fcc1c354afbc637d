//! Low-level register I/O for the packet DMA engine
//!
//! Every register access in the HAL funnels through here so the override /
//! default accessor choice is made in exactly one place.
//!
//! Ordering: writes that change live DMA state are followed by
//! [`memory_barrier`]. It is the only ordering primitive this layer uses.

use std::sync::atomic::{fence, Ordering};

use crate::device::DeviceContext;

/// Read a 32-bit register through the device's accessor
#[inline]
pub fn reg_read32(dev: &DeviceContext, addr: u32) -> u32 {
    dev.reg_access().read32(addr)
}

/// Write a 32-bit register through the device's accessor
#[inline]
pub fn reg_write32(dev: &DeviceContext, addr: u32, value: u32) {
    dev.reg_access().write32(addr, value);
}

/// Read-modify-write: `set` bits are OR-ed in after `clear` bits are removed
#[inline]
pub(crate) fn reg_modify32(dev: &DeviceContext, addr: u32, clear: u32, set: u32) -> u32 {
    let value = (reg_read32(dev, addr) & !clear) | set;
    reg_write32(dev, addr, value);
    value
}

/// Full memory barrier
///
/// Makes every preceding register store visible to the engine before any
/// following load or store (e.g. producing descriptors after a start).
#[inline]
pub fn memory_barrier() {
    fence(Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TracingIrqController;
    use crate::backends::SoftwareRegisters;
    use crate::config::DeviceConfig;
    use std::sync::Arc;

    #[test]
    fn modify_preserves_untouched_bits() {
        let regs = Arc::new(SoftwareRegisters::new());
        let dev = DeviceContext::new(
            &DeviceConfig::default(),
            regs.clone(),
            Arc::new(TracingIrqController),
        )
        .unwrap();

        regs.poke(0x2100, 0b1010);
        let v = reg_modify32(&dev, 0x2100, 0b0010, 0b0001);
        assert_eq!(v, 0b1001);
        assert_eq!(regs.writes_to(0x2100), vec![0b1001]);
        assert_eq!(reg_read32(&dev, 0x2100), 0b1001);
    }
}
