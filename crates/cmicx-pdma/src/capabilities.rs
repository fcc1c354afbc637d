//! Hardware information discovered by `hw_init`
//!
//! Channel topology and descriptor sizing are fixed for the CMICx family;
//! the receive packet-header size is read from the chip. The interrupt
//! numbering constants are consumed by the owning driver's interrupt
//! routing, not by this layer.

use cmicx_chip::topology::{
    CMC_CHAN, CMC_MAX, DCB_SIZE, DEV_NAME, IRQ_MASK_SHIFT, IRQ_NUM_OFFSET, IRQ_START_NUM,
    NUM_CHANS, TX_PKT_HDR_SIZE,
};

/// Packet DMA hardware information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwInfo {
    /// Device family name
    pub name: &'static str,

    /// Device identifier, copied from the device context
    pub dev_id: u32,

    /// Groups (CMCs) per device
    pub num_cmcs: usize,

    /// Channels per group
    pub cmc_chans: usize,

    /// Total channels
    pub num_chans: usize,

    /// Receive descriptor size in bytes
    pub rx_dcb_size: u32,

    /// Transmit descriptor size in bytes
    pub tx_dcb_size: u32,

    /// Receive packet-header size in bytes (discovered)
    pub rx_ph_size: u32,

    /// Transmit packet-header size in bytes
    pub tx_ph_size: u32,

    /// First host interrupt number of the engine
    pub intr_start_num: u32,

    /// Interrupt number stride between groups
    pub intr_num_offset: u32,

    /// Group mask shift inside the shared raw status registers
    pub intr_mask_shift: u32,
}

impl HwInfo {
    /// Build the info block from the `EP_TO_CPU_HEADER_SIZE` register value.
    ///
    /// The low nibble counts 8-byte words.
    pub const fn from_header_size_reg(dev_id: u32, header_size_reg: u32) -> Self {
        Self {
            name: DEV_NAME,
            dev_id,
            num_cmcs: CMC_MAX,
            cmc_chans: CMC_CHAN,
            num_chans: NUM_CHANS,
            rx_dcb_size: DCB_SIZE,
            tx_dcb_size: DCB_SIZE,
            rx_ph_size: (header_size_reg & 0xf) * 8,
            tx_ph_size: TX_PKT_HDR_SIZE,
            intr_start_num: IRQ_START_NUM,
            intr_num_offset: IRQ_NUM_OFFSET,
            intr_mask_shift: IRQ_MASK_SHIFT,
        }
    }

    /// Host interrupt number serving group `g`
    pub const fn group_irq(&self, g: usize) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let g = g as u32;
        self.intr_start_num + g * self.intr_num_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_size_is_low_nibble_in_words() {
        assert_eq!(HwInfo::from_header_size_reg(0, 0x0000_0004).rx_ph_size, 32);
        assert_eq!(HwInfo::from_header_size_reg(0, 0xffff_fff2).rx_ph_size, 16);
        assert_eq!(HwInfo::from_header_size_reg(0, 0).rx_ph_size, 0);
    }

    #[test]
    fn fixed_topology() {
        let info = HwInfo::from_header_size_reg(0xb880, 0);
        assert_eq!(info.name, "cmicx");
        assert_eq!(info.dev_id, 0xb880);
        assert_eq!(info.num_chans, 16);
        assert_eq!(info.rx_dcb_size, 16);
        assert_eq!(info.tx_ph_size, 16);
        assert_eq!(info.group_irq(0), 160);
        assert_eq!(info.group_irq(1), 164);
    }
}
