//! PCIe bus view of the engine.
//!
//! The PDMA engine is reached through BAR0 of the switch's PCIe endpoint.
//! Descriptor addresses handed to the engine are host DMA addresses; the
//! upper 32 bits carry an outbound-window select bit on top of the raw
//! address.

/// BAR holding the CMIC register space.
pub const CMIC_BAR_INDEX: usize = 0;

/// Outbound PCIe window select, OR-ed into the high address word.
pub const PCIE_SO_OFFSET: u32 = 0x1000_0000;

/// Transform the high 32 bits of a host DMA address into the bus view.
#[must_use]
pub const fn dma_to_bus_hi(hi: u32) -> u32 {
    hi | PCIE_SO_OFFSET
}

/// Split a 64-bit DMA address into the `(lo, hi)` register words the
/// engine expects, with the bus transform applied to `hi`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn split_dma_addr(addr: u64) -> (u32, u32) {
    (addr as u32, dma_to_bus_hi((addr >> 32) as u32))
}
