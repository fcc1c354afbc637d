//! CMIC register map for the packet DMA engine.
//!
//! Every group (CMC) owns a 4 KB block. Inside it, each of the eight DMA
//! channels owns a 0x80 stride of per-channel registers, and the group owns
//! one pair of interrupt status / status-clear registers shared by all its
//! channels.
//!
//! ```text
//! 0x2000 + 0x1000·g              group g block
//!   +0x06c                       IRQ_STAT        (4 bits per channel)
//!   +0x074                       IRQ_STAT_CLR
//!   +0x100 + 0x80·q              channel q block (see `chan` offsets)
//! ```
//!
//! The host interrupt controller exposes three raw status registers that
//! pack groups differently; see [`irq`].

// ── Group / channel addressing ───────────────────────────────────────────────

/// Base of group 0's register block.
pub const CMC_BASE: u32 = 0x2000;
/// Stride between group blocks.
pub const CMC_STRIDE: u32 = 0x1000;
/// Offset of channel 0's block inside a group block.
pub const CHAN_BASE: u32 = 0x100;
/// Stride between channel blocks.
pub const CHAN_STRIDE: u32 = 0x80;

/// Base address of group `g`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn grp_base(g: usize) -> u32 {
    CMC_BASE + CMC_STRIDE * g as u32
}

/// Base address of channel `q` in group `g`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn chan_base(g: usize, q: usize) -> u32 {
    grp_base(g) + CHAN_BASE + CHAN_STRIDE * q as u32
}

/// Per-channel register offsets, relative to [`chan_base`].
pub mod chan {
    /// Channel control.
    pub const CTRL: u32 = 0x00;
    /// Descriptor ring base, low word.
    pub const DESC_LO: u32 = 0x04;
    /// Descriptor ring base, high word (bus view).
    pub const DESC_HI: u32 = 0x08;
    /// Descriptor currently being processed, low word.
    pub const CURR_DESC_LO: u32 = 0x0c;
    /// Descriptor currently being processed, high word.
    pub const CURR_DESC_HI: u32 = 0x10;
    /// Channel status.
    pub const STAT: u32 = 0x14;
    /// Receive class-of-service control 0.
    pub const COS_CTRL_RX0: u32 = 0x18;
    /// Receive class-of-service control 1.
    pub const COS_CTRL_RX1: u32 = 0x1c;
    /// Interrupt coalescing.
    pub const INTR_COAL: u32 = 0x20;
    /// Receive buffer threshold.
    pub const RBUF_THRE: u32 = 0x24;
    /// Halt descriptor address, low word.
    pub const DESC_HALT_LO: u32 = 0x28;
    /// Halt descriptor address, high word (bus view).
    pub const DESC_HALT_HI: u32 = 0x2c;
    /// Received packet counter.
    pub const COUNT_RX: u32 = 0x30;
    /// Transmitted packet counter.
    pub const COUNT_TX: u32 = 0x34;
    /// Dropped receive packet counter.
    pub const COUNT_RX_DROP: u32 = 0x38;
}

/// Channel control register of `(g, q)`.
#[must_use]
pub const fn ctrl(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::CTRL
}
/// Descriptor base low word of `(g, q)`.
#[must_use]
pub const fn desc_lo(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::DESC_LO
}
/// Descriptor base high word of `(g, q)`.
#[must_use]
pub const fn desc_hi(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::DESC_HI
}
/// Current descriptor low word of `(g, q)`.
#[must_use]
pub const fn curr_desc_lo(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::CURR_DESC_LO
}
/// Current descriptor high word of `(g, q)`.
#[must_use]
pub const fn curr_desc_hi(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::CURR_DESC_HI
}
/// Halt address low word of `(g, q)`.
#[must_use]
pub const fn desc_halt_lo(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::DESC_HALT_LO
}
/// Halt address high word of `(g, q)`.
#[must_use]
pub const fn desc_halt_hi(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::DESC_HALT_HI
}
/// Status register of `(g, q)`.
#[must_use]
pub const fn stat(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::STAT
}
/// Receive CoS control 0 of `(g, q)`.
#[must_use]
pub const fn cos_ctrl_rx0(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::COS_CTRL_RX0
}
/// Receive CoS control 1 of `(g, q)`.
#[must_use]
pub const fn cos_ctrl_rx1(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::COS_CTRL_RX1
}
/// Interrupt coalescing register of `(g, q)`.
#[must_use]
pub const fn intr_coal(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::INTR_COAL
}
/// Receive buffer threshold of `(g, q)`.
#[must_use]
pub const fn rbuf_thre(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::RBUF_THRE
}
/// Receive packet counter of `(g, q)`.
#[must_use]
pub const fn count_rx(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::COUNT_RX
}
/// Transmit packet counter of `(g, q)`.
#[must_use]
pub const fn count_tx(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::COUNT_TX
}
/// Receive drop counter of `(g, q)`.
#[must_use]
pub const fn count_rx_drop(g: usize, q: usize) -> u32 {
    chan_base(g, q) + chan::COUNT_RX_DROP
}

/// Group interrupt status (raw pending bits for all channels of `g`).
#[must_use]
pub const fn irq_stat(g: usize) -> u32 {
    grp_base(g) + 0x06c
}

/// Group interrupt status clear (write-one-to-clear).
#[must_use]
pub const fn irq_stat_clr(g: usize) -> u32 {
    grp_base(g) + 0x074
}

// ── Device-wide ──────────────────────────────────────────────────────────────

/// Receive packet-header size capability. Low nibble counts 8-byte words.
pub const EP_TO_CPU_HEADER_SIZE: u32 = 0x0004;

/// Receive-buffer endpoint interface release. Pulsed 0 → 1 after config.
pub const RXBUF_EPINTF_RELEASE: u32 = 0x1a04;

// ── Channel control bits ─────────────────────────────────────────────────────

/// Channel control register bit definitions.
pub mod ctrl_bits {
    /// Channel enable.
    pub const ENABLE: u32 = 1 << 0;
    /// Direction: set for transmit (memory to switch), clear for receive.
    pub const DIR: u32 = 1 << 1;
    /// Abort in-flight descriptor processing.
    pub const ABORT: u32 = 1 << 2;
    /// Descriptors are big-endian.
    pub const DESC_BIG_ENDIAN: u32 = 1 << 3;
    /// Packet data is big-endian.
    pub const PKT_BIG_ENDIAN: u32 = 1 << 4;
    /// Raise an interrupt on every completed descriptor.
    pub const INTR_ON_DESC: u32 = 1 << 6;
    /// Continuous (ring) descriptor mode rather than chained.
    pub const CONTINUOUS: u32 = 1 << 9;
    /// Packet headers are big-endian.
    pub const HDR_BIG_ENDIAN: u32 = 1 << 12;
}

// ── Channel status bits ──────────────────────────────────────────────────────

/// Channel status register bit definitions.
pub mod stat_bits {
    /// Descriptor chain completed.
    pub const CHAIN_DONE: u32 = 1 << 0;
    /// Channel is still moving data.
    pub const IS_ACTIVE: u32 = 1 << 1;
}

// ── Group interrupt bits ─────────────────────────────────────────────────────

/// Group interrupt layout: one nibble per channel.
pub mod irq {
    /// Bits per channel in a group interrupt word.
    pub const BITS_PER_CHAN: u32 = 4;

    /// All interrupt bits owned by local channel `q`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn mask(q: usize) -> u32 {
        0xf << (q as u32 * BITS_PER_CHAN)
    }

    /// Descriptor-done interrupt of local channel `q`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn desc_done(q: usize) -> u32 {
        0x1 << (q as u32 * BITS_PER_CHAN)
    }

    /// Chain-done interrupt of local channel `q`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn chain_done(q: usize) -> u32 {
        0x2 << (q as u32 * BITS_PER_CHAN)
    }

    /// Controlled (controller-done) interrupt of local channel `q`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn ctrld_intr(q: usize) -> u32 {
        0x4 << (q as u32 * BITS_PER_CHAN)
    }

    /// Host interrupt controller raw status 0: group 0, natural positions.
    pub const RAW_STAT0: u32 = 0x1801_3150;
    /// Raw status 1: low channels (0..4) of groups above 0, shifted up.
    pub const RAW_STAT1: u32 = 0x1801_3154;
    /// Raw status 2: high channels (4..8) of groups above 0, shifted down.
    pub const RAW_STAT2: u32 = 0x1801_3158;

    /// Mask applied to a raw status address to form the selector handed to
    /// the interrupt controller.
    pub const SELECTOR_MASK: u32 = 0xfff;
}

// ── Interrupt coalescing ─────────────────────────────────────────────────────

/// Interrupt coalescing register fields.
pub mod coal {
    /// Coalescing enable.
    pub const ENA: u32 = 1 << 31;

    /// Descriptor-count threshold field (15 bits).
    #[must_use]
    pub const fn thresh(count: u32) -> u32 {
        (count & 0x7fff) << 16
    }

    /// Timer field (16 bits).
    #[must_use]
    pub const fn timer(timer: u32) -> u32 {
        timer & 0xffff
    }

    /// Complete coalescing word for `count` descriptors or `ticks` timer ticks.
    #[must_use]
    pub const fn encode(count: u32, ticks: u32) -> u32 {
        ENA | thresh(count) | timer(ticks)
    }
}
