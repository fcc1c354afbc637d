//! Interrupt mask routing through the operation table

mod common;

use cmicx_pdma::chip::regs::{self, irq};
use cmicx_pdma::chip::topology::{flat, CMC_CHAN, IRQ_MASK_SHIFT};
use cmicx_pdma::DeviceConfig;
use common::{rig, IrqCall};

#[test]
fn group0_enable_and_disable_are_unshifted() {
    let mut r = rig(&DeviceConfig::default());
    for q in 0..CMC_CHAN {
        r.ops.chan_intr_enable(&mut r.dev, q);
        assert_eq!(
            r.irq.last(),
            Some(IrqCall::Unmask {
                group: 0,
                chan: q,
                selector: 0x150,
                mask: r.dev.irq_mask(0),
            })
        );
    }
    assert_eq!(r.dev.irq_mask(0), 0x4444_4444);

    r.ops.chan_intr_disable(&mut r.dev, 3);
    assert_eq!(
        r.irq.last(),
        Some(IrqCall::Mask { group: 0, chan: 3, selector: 0x150, mask: 0x4444_0444 })
    );
}

#[test]
fn low_channels_of_group1_shift_up() {
    let mut r = rig(&DeviceConfig::default());
    for q in 0..4 {
        let mut fresh = rig(&DeviceConfig::default());
        fresh.ops.chan_intr_enable(&mut fresh.dev, flat(1, q));
        let b = irq::ctrld_intr(q);
        assert_eq!(
            fresh.irq.last(),
            Some(IrqCall::Unmask { group: 1, chan: q, selector: 0x154, mask: b << IRQ_MASK_SHIFT })
        );
        assert_eq!(fresh.dev.irq_mask(1), b);
    }

    r.ops.chan_intr_enable(&mut r.dev, 9);
    r.ops.chan_intr_enable(&mut r.dev, 10);
    assert_eq!(r.dev.irq_mask(1), irq::ctrld_intr(1) | irq::ctrld_intr(2));
}

#[test]
fn high_channels_of_group1_shift_down() {
    for q in 4..CMC_CHAN {
        let mut r = rig(&DeviceConfig::default());
        r.ops.chan_intr_enable(&mut r.dev, flat(1, q));
        let b = irq::ctrld_intr(q);
        assert_eq!(
            r.irq.last(),
            Some(IrqCall::Unmask {
                group: 1,
                chan: q,
                selector: 0x158,
                mask: b >> (32 - IRQ_MASK_SHIFT),
            })
        );
        assert_eq!(r.dev.irq_mask(1), b);
    }
}

#[test]
fn check_is_false_while_masked_even_if_pending() {
    let mut r = rig(&DeviceConfig::default());
    let stat = regs::irq_stat(1);
    r.regs.poke(stat, irq::ctrld_intr(6));

    assert!(r.ops.chan_intr_query(&r.dev, 14));
    let reads = r.regs.read_count(stat);
    assert!(!r.ops.chan_intr_check(&r.dev, 14));
    assert_eq!(r.regs.read_count(stat), reads);

    r.ops.chan_intr_enable(&mut r.dev, 14);
    assert!(r.ops.chan_intr_check(&r.dev, 14));

    r.ops.chan_intr_disable(&mut r.dev, 14);
    assert!(!r.ops.chan_intr_check(&r.dev, 14));
    assert!(r.ops.chan_intr_query(&r.dev, 14));
}

#[test]
fn query_ignores_other_channels() {
    let r = rig(&DeviceConfig::default());
    r.regs.poke(regs::irq_stat(0), irq::mask(0) | irq::desc_done(1) | irq::chain_done(1));
    assert!(r.ops.chan_intr_query(&r.dev, 0));
    assert!(!r.ops.chan_intr_query(&r.dev, 1));
}

#[test]
fn groups_keep_separate_caches() {
    let mut r = rig(&DeviceConfig::default());
    r.ops.chan_intr_enable(&mut r.dev, 2);
    r.ops.chan_intr_enable(&mut r.dev, 10);
    assert_eq!(r.dev.irq_mask(0), irq::ctrld_intr(2));
    assert_eq!(r.dev.irq_mask(1), irq::ctrld_intr(2));
    assert_eq!(r.irq.calls().len(), 2);
}

#[test]
fn group1_disable_routes_remaining_mask_per_half() {
    let mut r = rig(&DeviceConfig::default());
    r.ops.chan_intr_enable(&mut r.dev, flat(1, 1));
    r.ops.chan_intr_enable(&mut r.dev, flat(1, 5));

    // High channel off: stat2 sees what is left of the high half, i.e. nothing.
    r.ops.chan_intr_disable(&mut r.dev, flat(1, 5));
    assert_eq!(
        r.irq.last(),
        Some(IrqCall::Mask { group: 1, chan: 5, selector: 0x158, mask: 0 })
    );
    assert_eq!(r.dev.irq_mask(1), irq::ctrld_intr(1));

    // Re-enable high, drop low: stat1 loses the low bit, high bit shifts out.
    r.ops.chan_intr_enable(&mut r.dev, flat(1, 5));
    r.ops.chan_intr_disable(&mut r.dev, flat(1, 1));
    assert_eq!(
        r.irq.last(),
        Some(IrqCall::Mask { group: 1, chan: 1, selector: 0x154, mask: 0 })
    );
    assert_eq!(r.dev.irq_mask(1), irq::ctrld_intr(5));

    // Low channel back on while high stays: stat1 carries only the low bit.
    r.ops.chan_intr_enable(&mut r.dev, flat(1, 2));
    r.ops.chan_intr_disable(&mut r.dev, flat(1, 3));
    assert_eq!(
        r.irq.last(),
        Some(IrqCall::Mask {
            group: 1,
            chan: 3,
            selector: 0x154,
            mask: irq::ctrld_intr(2) << IRQ_MASK_SHIFT,
        })
    );
}
