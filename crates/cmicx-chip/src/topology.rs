//! Channel topology and device-wide sizing constants.
//!
//! A device carries up to [`CMC_MAX`] groups (CMCs) of [`CMC_CHAN`] DMA
//! channels each. A flat channel index decomposes into `(group, local)`.
//!
//! ```text
//! flat:   0  1  2  3  4  5  6  7 |  8  9 10 11 12 13 14 15
//! group:  0                      |  1
//! local:  0  1  2  3  4  5  6  7 |  0  1  2  3  4  5  6  7
//! ```

/// Groups (CMCs) per device.
pub const CMC_MAX: usize = 2;

/// DMA channels per group.
pub const CMC_CHAN: usize = 8;

/// Total channels per device.
pub const NUM_CHANS: usize = CMC_MAX * CMC_CHAN;

/// Descriptor (DCB) size in bytes, identical for receive and transmit.
pub const DCB_SIZE: u32 = 16;

/// Transmit packet-header size in bytes.
pub const TX_PKT_HDR_SIZE: u32 = 16;

/// First host interrupt number routed to the packet DMA engine.
pub const IRQ_START_NUM: u32 = 128 + 32;

/// Interrupt number stride between groups.
pub const IRQ_NUM_OFFSET: u32 = 4;

/// Bit offset of a group's mask inside the shared raw status registers.
pub const IRQ_MASK_SHIFT: u32 = 16;

/// Status polls issued by a channel stop before giving up on the drain.
pub const HW_RETRY_TIMES: u32 = 100_000;

/// Device name reported by the HAL.
pub const DEV_NAME: &str = "cmicx";

/// Group owning flat channel `chan`.
#[must_use]
pub const fn group_of(chan: usize) -> usize {
    chan / CMC_CHAN
}

/// Channel index of flat channel `chan` within its group.
#[must_use]
pub const fn local_of(chan: usize) -> usize {
    chan % CMC_CHAN
}

/// Flat channel index of `(group, local)`.
#[must_use]
pub const fn flat(group: usize, local: usize) -> usize {
    group * CMC_CHAN + local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_decomposition() {
        assert_eq!(group_of(0), 0);
        assert_eq!(local_of(7), 7);
        assert_eq!(group_of(8), 1);
        assert_eq!(local_of(8), 0);
        assert_eq!(group_of(13), 1);
        assert_eq!(local_of(13), 5);
        for chan in 0..NUM_CHANS {
            assert_eq!(flat(group_of(chan), local_of(chan)), chan);
        }
    }

    #[test]
    fn mask_shift_splits_word_in_half() {
        // Low channels (nibbles 0..3) and high channels (nibbles 4..7) each
        // fill one half of a 32-bit mask word.
        assert_eq!(IRQ_MASK_SHIFT, 32 - IRQ_MASK_SHIFT);
    }
}
