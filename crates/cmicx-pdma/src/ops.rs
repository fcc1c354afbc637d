//! Operation table handed to the owning driver
//!
//! The driver core is chip-agnostic: it asks for the table once per
//! device and calls through it. Every entry takes the device context
//! explicitly; the table itself is stateless.

use std::fmt::Debug;

use cmicx_chip::topology::CMC_MAX;

use crate::capabilities::HwInfo;
use crate::channel::{self, StopOutcome};
use crate::device::DeviceContext;
use crate::dump::{self, RegisterDump};
use crate::error::{PdmaError, Result};
use crate::{hw, io};

/// Packet DMA hardware operations
///
/// Channel arguments are flat indices (`group * 8 + local`). None of the
/// hardware operations fail; an out-of-range channel is a caller bug and
/// panics.
pub trait PdmaOps: Debug + Send + Sync {
    /// Read a 32-bit register
    fn reg_read32(&self, dev: &DeviceContext, addr: u32) -> u32;

    /// Write a 32-bit register
    fn reg_write32(&self, dev: &DeviceContext, addr: u32, value: u32);

    /// Quiesce every attached channel, clear its interrupt status and
    /// discover hardware info (also stored in the context)
    fn hw_init(&self, dev: &mut DeviceContext) -> HwInfo;

    /// Program each configured queue's control word, then pulse the
    /// receive-buffer interface release
    fn hw_config(&self, dev: &DeviceContext);

    /// Zero every attached channel's control register
    ///
    /// Interrupt status and the cached masks are left alone.
    fn hw_reset(&self, dev: &mut DeviceContext);

    /// Enable a channel
    fn chan_start(&self, dev: &mut DeviceContext, chan: usize);

    /// Abort a channel and wait (bounded) for it to drain
    ///
    /// Never fails. Check [`StopOutcome::drained`] to learn whether the
    /// engine actually went inactive.
    fn chan_stop(&self, dev: &mut DeviceContext, chan: usize) -> StopOutcome;

    /// Program the descriptor base address
    fn chan_setup(&self, dev: &mut DeviceContext, chan: usize, addr: u64);

    /// Program the halt descriptor address
    fn chan_goto(&self, dev: &DeviceContext, chan: usize, addr: u64);

    /// Acknowledge the channel's controlled interrupt
    fn chan_clear(&self, dev: &DeviceContext, chan: usize);

    /// Enable the channel's controlled interrupt
    fn chan_intr_enable(&self, dev: &mut DeviceContext, chan: usize);

    /// Disable the channel's controlled interrupt
    fn chan_intr_disable(&self, dev: &mut DeviceContext, chan: usize);

    /// Raw interrupt status, regardless of mask
    fn chan_intr_query(&self, dev: &DeviceContext, chan: usize) -> bool;

    /// Interrupt pending and enabled
    fn chan_intr_check(&self, dev: &DeviceContext, chan: usize) -> bool;

    /// Coalesce interrupts: fire after `count` descriptors or `timer` ticks
    fn chan_intr_coalesce(&self, dev: &DeviceContext, chan: usize, count: u32, timer: u32);

    /// Snapshot of the channel's registers
    fn chan_reg_dump(&self, dev: &DeviceContext, chan: usize) -> RegisterDump;
}

/// CMICx packet DMA
#[derive(Debug, Clone, Copy, Default)]
pub struct CmicxPdma;

impl PdmaOps for CmicxPdma {
    fn reg_read32(&self, dev: &DeviceContext, addr: u32) -> u32 {
        io::reg_read32(dev, addr)
    }

    fn reg_write32(&self, dev: &DeviceContext, addr: u32, value: u32) {
        io::reg_write32(dev, addr, value);
    }

    fn hw_init(&self, dev: &mut DeviceContext) -> HwInfo {
        hw::init(dev)
    }

    fn hw_config(&self, dev: &DeviceContext) {
        hw::config(dev);
    }

    fn hw_reset(&self, dev: &mut DeviceContext) {
        hw::reset(dev);
    }

    fn chan_start(&self, dev: &mut DeviceContext, chan: usize) {
        channel::start(dev, chan);
    }

    fn chan_stop(&self, dev: &mut DeviceContext, chan: usize) -> StopOutcome {
        channel::stop(dev, chan)
    }

    fn chan_setup(&self, dev: &mut DeviceContext, chan: usize, addr: u64) {
        channel::setup(dev, chan, addr);
    }

    fn chan_goto(&self, dev: &DeviceContext, chan: usize, addr: u64) {
        channel::goto_halt(dev, chan, addr);
    }

    fn chan_clear(&self, dev: &DeviceContext, chan: usize) {
        channel::clear(dev, chan);
    }

    fn chan_intr_enable(&self, dev: &mut DeviceContext, chan: usize) {
        channel::intr_enable(dev, chan);
    }

    fn chan_intr_disable(&self, dev: &mut DeviceContext, chan: usize) {
        channel::intr_disable(dev, chan);
    }

    fn chan_intr_query(&self, dev: &DeviceContext, chan: usize) -> bool {
        channel::intr_query(dev, chan)
    }

    fn chan_intr_check(&self, dev: &DeviceContext, chan: usize) -> bool {
        channel::intr_check(dev, chan)
    }

    fn chan_intr_coalesce(&self, dev: &DeviceContext, chan: usize, count: u32, timer: u32) {
        channel::intr_coalesce(dev, chan, count, timer);
    }

    fn chan_reg_dump(&self, dev: &DeviceContext, chan: usize) -> RegisterDump {
        dump::chan_reg_dump(dev, chan)
    }
}

/// Operation table for `dev`
///
/// # Errors
///
/// Returns error if the context's group count is outside what the CMICx
/// family supports. A context built by [`DeviceContext::new`] has already
/// passed [`DeviceConfig::validate`](crate::DeviceConfig::validate), so
/// this cannot fire for it.
pub fn pdma_ops(dev: &DeviceContext) -> Result<Box<dyn PdmaOps>> {
    let groups = dev.num_groups();
    if groups == 0 || groups > CMC_MAX {
        return Err(PdmaError::invalid_param(format!(
            "CMICx supports 1..={CMC_MAX} groups, context has {groups}"
        )));
    }
    tracing::debug!("Device {:#x}: CMICx PDMA ops, {groups} groups", dev.dev_id());
    Ok(Box::new(CmicxPdma))
}
