//! Channel lifecycle against the simulated register file

mod common;

use cmicx_pdma::chip::regs::{self, ctrl_bits, irq, stat_bits};
use cmicx_pdma::chip::topology::HW_RETRY_TIMES;
use cmicx_pdma::{ChannelState, DeviceConfig, StopOutcome};
use common::rig;

#[test]
fn stop_then_start_leaves_only_enable() {
    let mut r = rig(&DeviceConfig::default());
    r.ops.chan_setup(&mut r.dev, 3, 0x8000);
    r.ops.chan_start(&mut r.dev, 3);

    r.regs.script_reads(regs::stat(0, 3), [stat_bits::IS_ACTIVE; 7]);
    let out = r.ops.chan_stop(&mut r.dev, 3);
    assert_eq!(out, StopOutcome { polls: 8, drained: true });

    r.ops.chan_start(&mut r.dev, 3);
    assert_eq!(r.regs.peek(regs::ctrl(0, 3)), ctrl_bits::ENABLE);
}

#[test]
fn stop_keeps_configuration_bits() {
    let mut r = rig(&DeviceConfig::default());
    let ctrl = regs::ctrl(1, 0);
    r.regs.poke(ctrl, ctrl_bits::DIR | ctrl_bits::INTR_ON_DESC | ctrl_bits::ENABLE);

    r.ops.chan_stop(&mut r.dev, 8);
    assert_eq!(r.regs.peek(ctrl), ctrl_bits::DIR | ctrl_bits::INTR_ON_DESC);

    // Abort is requested before polling.
    let writes = r.regs.writes_to(ctrl);
    assert_eq!(writes.len(), 2);
    assert_ne!(writes[0] & ctrl_bits::ABORT, 0);
    assert_ne!(writes[0] & ctrl_bits::ENABLE, 0);
}

#[test]
fn stop_on_stuck_channel_is_bounded_and_still_clears() {
    let mut r = rig(&DeviceConfig::default());
    let (ctrl, stat) = (regs::ctrl(0, 5), regs::stat(0, 5));
    r.regs.poke(stat, stat_bits::IS_ACTIVE);
    r.regs.poke(ctrl, ctrl_bits::ENABLE);

    let out = r.ops.chan_stop(&mut r.dev, 5);

    assert!(!out.drained);
    assert_eq!(out.polls, HW_RETRY_TIMES);
    assert_eq!(r.regs.read_count(stat), u64::from(HW_RETRY_TIMES));
    assert_eq!(r.regs.peek(ctrl) & (ctrl_bits::ENABLE | ctrl_bits::ABORT), 0);
    assert_eq!(r.regs.writes_to(regs::irq_stat_clr(0)), vec![irq::ctrld_intr(5)]);
    assert_eq!(r.dev.chan_state(5), ChannelState::Idle);
}

#[test]
fn setup_and_goto_write_lo_then_bus_hi() {
    let mut r = rig(&DeviceConfig::default());
    r.ops.chan_setup(&mut r.dev, 12, 0x0000_0002_1234_5670);
    r.ops.chan_goto(&r.dev, 12, 0x0000_0002_1234_5700);

    let (g, q) = (1, 4);
    assert_eq!(
        r.regs.writes(),
        vec![
            (regs::desc_lo(g, q), 0x1234_5670),
            (regs::desc_hi(g, q), 0x1000_0002),
            (regs::desc_halt_lo(g, q), 0x1234_5700),
            (regs::desc_halt_hi(g, q), 0x1000_0002),
        ]
    );
    assert_eq!(r.dev.chan_state(12), ChannelState::Configured);
}

#[test]
fn clear_acknowledges_only_controlled_interrupt() {
    let r = rig(&DeviceConfig::default());
    r.ops.chan_clear(&r.dev, 15);
    assert_eq!(r.regs.writes(), vec![(regs::irq_stat_clr(1), irq::ctrld_intr(7))]);
}

#[test]
fn coalesce_writes_combined_word() {
    let r = rig(&DeviceConfig::default());
    r.ops.chan_intr_coalesce(&r.dev, 1, 0x20, 0x1ff);
    assert_eq!(r.regs.peek(regs::intr_coal(0, 1)), 0x8000_0000 | (0x20 << 16) | 0x1ff);
}

#[test]
fn full_lifecycle_tracks_state() {
    let mut r = rig(&DeviceConfig::default());
    assert_eq!(r.dev.chan_state(9), ChannelState::Idle);
    r.ops.chan_setup(&mut r.dev, 9, 0x4000);
    assert_eq!(r.dev.chan_state(9), ChannelState::Configured);
    r.ops.chan_start(&mut r.dev, 9);
    assert_eq!(r.dev.chan_state(9), ChannelState::Running);
    r.ops.chan_stop(&mut r.dev, 9);
    assert_eq!(r.dev.chan_state(9), ChannelState::Idle);
}
