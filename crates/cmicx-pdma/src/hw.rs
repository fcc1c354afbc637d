//! Global hardware init / config / reset
//!
//! Device-wide sweeps over attached groups, plus the per-queue control
//! word the engine runs with.

use cmicx_chip::regs::{self, ctrl_bits, irq};
use cmicx_chip::topology::{flat, local_of, CMC_CHAN};

use crate::capabilities::HwInfo;
use crate::channel::ChannelState;
use crate::config::{DevFlags, Direction, QueueFlags};
use crate::device::{DeviceContext, Queue};
use crate::io::{reg_read32, reg_write32};

/// Control word for a queue, starting from the register's current value.
///
/// Byte-swap flags map one-to-one onto the big-endian control bits. The
/// engine runs in continuous mode unless descriptors are chained, always
/// interrupts per descriptor, and has DIR set for transmit only.
#[must_use]
pub fn queue_ctrl_word(
    current: u32,
    dev_flags: DevFlags,
    que_flags: QueueFlags,
    direction: Direction,
) -> u32 {
    let mut val = current;
    if que_flags.contains(QueueFlags::PKT_BYTE_SWAP) {
        val |= ctrl_bits::PKT_BIG_ENDIAN;
    }
    if que_flags.contains(QueueFlags::OTH_BYTE_SWAP) {
        val |= ctrl_bits::DESC_BIG_ENDIAN;
    }
    if que_flags.contains(QueueFlags::HDR_BYTE_SWAP) {
        val |= ctrl_bits::HDR_BIG_ENDIAN;
    }
    if !dev_flags.contains(DevFlags::CHAIN_MODE) {
        val |= ctrl_bits::CONTINUOUS;
    }
    val |= ctrl_bits::INTR_ON_DESC;
    match direction {
        Direction::Rx => val & !ctrl_bits::DIR,
        Direction::Tx => val | ctrl_bits::DIR,
    }
}

fn attached_groups(dev: &DeviceContext) -> impl Iterator<Item = usize> + '_ {
    (0..dev.num_groups()).filter(|&g| dev.group(g).attached)
}

pub(crate) fn init(dev: &mut DeviceContext) -> HwInfo {
    let groups: Vec<usize> = attached_groups(dev).collect();
    for &g in &groups {
        for q in 0..CMC_CHAN {
            reg_write32(dev, regs::ctrl(g, q), 0);
            reg_write32(dev, regs::irq_stat_clr(g), irq::mask(q));
            dev.set_chan_state(flat(g, q), ChannelState::Idle);
        }
    }
    tracing::debug!("init sweep over groups {groups:?}");

    let header_size = reg_read32(dev, regs::EP_TO_CPU_HEADER_SIZE);
    let info = HwInfo::from_header_size_reg(dev.dev_id(), header_size);
    tracing::info!(
        "{} {:#x}: {} channels, rx header {} B, tx header {} B",
        info.name,
        info.dev_id,
        dev.num_chans(),
        info.rx_ph_size,
        info.tx_ph_size
    );
    dev.info = Some(info.clone());
    info
}

fn config_queue(dev: &DeviceContext, queue: Queue, direction: Direction) {
    let q = local_of(queue.chan_id);
    let reg = regs::ctrl(queue.group_id, q);
    let flags = dev.group(queue.group_id).que_ctrl[q];
    let val = queue_ctrl_word(reg_read32(dev, reg), dev.flags(), flags, direction);
    reg_write32(dev, reg, val);
    tracing::debug!("ch{} {direction:?}: ctrl={val:#010x}", queue.chan_id);
}

pub(crate) fn config(dev: &DeviceContext) {
    for &queue in dev.rx_queues() {
        config_queue(dev, queue, Direction::Rx);
    }
    for &queue in dev.tx_queues() {
        config_queue(dev, queue, Direction::Tx);
    }

    reg_write32(dev, regs::RXBUF_EPINTF_RELEASE, 0);
    reg_write32(dev, regs::RXBUF_EPINTF_RELEASE, 1);
}

pub(crate) fn reset(dev: &mut DeviceContext) {
    let groups: Vec<usize> = attached_groups(dev).collect();
    for &g in &groups {
        for q in 0..CMC_CHAN {
            reg_write32(dev, regs::ctrl(g, q), 0);
            dev.set_chan_state(flat(g, q), ChannelState::Idle);
        }
    }
    tracing::debug!("reset sweep over groups {groups:?}");
}
