//! Per-channel lifecycle
//!
//! ```text
//! Idle --setup--> Configured --start--> Running --stop--> Idle
//!                     ^                    |
//!                     +------ goto --------+   (halt address only)
//! ```
//!
//! Channels are addressed by flat index; the group is `chan / CMC_CHAN`,
//! the local index `chan % CMC_CHAN`. Out-of-range indices panic when the
//! group table is indexed. All operations are infallible at the register
//! level: the engine gives no error indication beyond status bits.

use cmicx_chip::bus::split_dma_addr;
use cmicx_chip::regs::{self, coal, ctrl_bits, irq, stat_bits};
use cmicx_chip::topology::{group_of, local_of, HW_RETRY_TIMES};

use crate::device::DeviceContext;
use crate::intr;
use crate::io::{memory_barrier, reg_modify32, reg_read32, reg_write32};

/// Lifecycle state of one channel, tracked in the device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Not programmed, or stopped
    #[default]
    Idle,
    /// Descriptor base programmed
    Configured,
    /// Enabled and processing descriptors
    Running,
    /// Abort requested, waiting for the engine to go inactive
    Stopping,
}

/// Result of a channel stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopOutcome {
    /// Status register reads performed
    pub polls: u32,
    /// Engine reported inactive before the poll budget ran out
    pub drained: bool,
}

#[inline]
fn split(chan: usize) -> (usize, usize) {
    (group_of(chan), local_of(chan))
}

/// Enable the channel.
pub(crate) fn start(dev: &mut DeviceContext, chan: usize) {
    let (g, q) = split(chan);
    match dev.chan_state(chan) {
        ChannelState::Configured => {}
        ChannelState::Running => tracing::warn!("ch{chan}: start while already running"),
        s => tracing::warn!("ch{chan}: start from {s:?}, descriptor base may be stale"),
    }

    reg_modify32(dev, regs::ctrl(g, q), 0, ctrl_bits::ENABLE);
    memory_barrier();
    dev.set_chan_state(chan, ChannelState::Running);
}

/// Abort the channel and wait (bounded) for it to go inactive.
///
/// The enable / abort bits are cleared and the controlled-interrupt status
/// acknowledged whether or not the engine drained in time.
pub(crate) fn stop(dev: &mut DeviceContext, chan: usize) -> StopOutcome {
    let (g, q) = split(chan);
    dev.set_chan_state(chan, ChannelState::Stopping);

    let ctrl = regs::ctrl(g, q);
    reg_modify32(dev, ctrl, 0, ctrl_bits::ENABLE | ctrl_bits::ABORT);
    memory_barrier();

    let stat = regs::stat(g, q);
    let mut polls = 0;
    let drained = loop {
        polls += 1;
        if reg_read32(dev, stat) & stat_bits::IS_ACTIVE == 0 {
            break true;
        }
        if polls >= HW_RETRY_TIMES {
            break false;
        }
    };

    if drained {
        tracing::debug!("ch{chan}: stopped after {polls} status polls");
    } else {
        tracing::warn!("ch{chan}: still active after {polls} status polls, forcing stop");
    }

    reg_modify32(dev, ctrl, ctrl_bits::ENABLE | ctrl_bits::ABORT, 0);
    reg_write32(dev, regs::irq_stat_clr(g), irq::ctrld_intr(q));
    memory_barrier();

    dev.set_chan_state(chan, ChannelState::Idle);
    StopOutcome { polls, drained }
}

fn write_addr(dev: &DeviceContext, lo_reg: u32, hi_reg: u32, addr: u64) {
    let (lo, hi) = split_dma_addr(addr);
    reg_write32(dev, lo_reg, lo);
    reg_write32(dev, hi_reg, hi);
    memory_barrier();
}

/// Program the descriptor base address.
pub(crate) fn setup(dev: &mut DeviceContext, chan: usize, addr: u64) {
    let (g, q) = split(chan);
    write_addr(dev, regs::desc_lo(g, q), regs::desc_hi(g, q), addr);

    match dev.chan_state(chan) {
        ChannelState::Idle | ChannelState::Configured => {
            dev.set_chan_state(chan, ChannelState::Configured);
        }
        s => tracing::warn!("ch{chan}: descriptor base reprogrammed while {s:?}"),
    }
}

/// Move the halt (stop-at) descriptor address.
pub(crate) fn goto_halt(dev: &DeviceContext, chan: usize, addr: u64) {
    let (g, q) = split(chan);
    write_addr(dev, regs::desc_halt_lo(g, q), regs::desc_halt_hi(g, q), addr);
}

/// Acknowledge the controlled-interrupt status.
pub(crate) fn clear(dev: &DeviceContext, chan: usize) {
    let (g, q) = split(chan);
    reg_write32(dev, regs::irq_stat_clr(g), irq::ctrld_intr(q));
    memory_barrier();
}

pub(crate) fn intr_enable(dev: &mut DeviceContext, chan: usize) {
    let (g, q) = split(chan);
    intr::intr_enable(dev, g, q, irq::ctrld_intr(q));
}

pub(crate) fn intr_disable(dev: &mut DeviceContext, chan: usize) {
    let (g, q) = split(chan);
    intr::intr_disable(dev, g, q, irq::ctrld_intr(q));
}

/// Controlled-interrupt status bit, read from hardware.
pub(crate) fn intr_query(dev: &DeviceContext, chan: usize) -> bool {
    let (g, q) = split(chan);
    reg_read32(dev, regs::irq_stat(g)) & irq::ctrld_intr(q) != 0
}

/// Like [`intr_query`], but false without a register read when the
/// interrupt is masked in the cache.
pub(crate) fn intr_check(dev: &DeviceContext, chan: usize) -> bool {
    let (g, q) = split(chan);
    if dev.irq_mask(g) & irq::ctrld_intr(q) == 0 {
        return false;
    }
    intr_query(dev, chan)
}

pub(crate) fn intr_coalesce(dev: &DeviceContext, chan: usize, count: u32, timer: u32) {
    let (g, q) = split(chan);
    reg_write32(dev, regs::intr_coal(g, q), coal::encode(count, timer));
}
