//! Register dump for troubleshooting

use std::fmt;

use cmicx_chip::regs;
use cmicx_chip::topology::{group_of, local_of};

use crate::device::DeviceContext;
use crate::io::reg_read32;

/// Labeled register values, in read order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterDump {
    entries: Vec<(String, u32)>,
}

impl RegisterDump {
    fn push(&mut self, label: String, value: u32) {
        tracing::info!("{label}: {value:#010x}");
        self.entries.push((label, value));
    }

    /// All `(label, value)` pairs.
    pub fn entries(&self) -> &[(String, u32)] {
        &self.entries
    }

    /// Value recorded under `label`, if present.
    pub fn get(&self, label: &str) -> Option<u32> {
        self.entries.iter().find(|(l, _)| l == label).map(|&(_, v)| v)
    }
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in &self.entries {
            writeln!(f, "{label:<36} 0x{value:08x}")?;
        }
        Ok(())
    }
}

/// Read every register of `chan`, its group's interrupt registers and the
/// header-size capability. Reads only.
pub(crate) fn chan_reg_dump(dev: &DeviceContext, chan: usize) -> RegisterDump {
    let (g, q) = (group_of(chan), local_of(chan));
    let per_chan: [(&str, u32); 15] = [
        ("CTRL", regs::ctrl(g, q)),
        ("DESC_LO", regs::desc_lo(g, q)),
        ("DESC_HI", regs::desc_hi(g, q)),
        ("CURR_DESC_LO", regs::curr_desc_lo(g, q)),
        ("CURR_DESC_HI", regs::curr_desc_hi(g, q)),
        ("DESC_HALT_ADDR_LO", regs::desc_halt_lo(g, q)),
        ("DESC_HALT_ADDR_HI", regs::desc_halt_hi(g, q)),
        ("COS_CTRL_RX_0", regs::cos_ctrl_rx0(g, q)),
        ("COS_CTRL_RX_1", regs::cos_ctrl_rx1(g, q)),
        ("INTR_COAL", regs::intr_coal(g, q)),
        ("RXBUF_THRESHOLD_CONFIG", regs::rbuf_thre(g, q)),
        ("STAT", regs::stat(g, q)),
        ("PKT_COUNT_RXPKT", regs::count_rx(g, q)),
        ("PKT_COUNT_TXPKT", regs::count_tx(g, q)),
        ("PKT_COUNT_RXPKT_DROP", regs::count_rx_drop(g, q)),
    ];

    let mut dump = RegisterDump::default();
    for (name, addr) in per_chan {
        dump.push(format!("CMIC_CMC{g}_DMA_CH{q}_{name}"), reg_read32(dev, addr));
    }
    dump.push(format!("CMIC_CMC{g}_IRQ_STAT"), reg_read32(dev, regs::irq_stat(g)));
    dump.push(format!("CMIC_CMC{g}_IRQ_STAT_CLR"), reg_read32(dev, regs::irq_stat_clr(g)));
    // Enable state lives in the host controller; report the cached mask.
    dump.push(format!("CMIC_CMC{g}_IRQ_ENAB"), dev.irq_mask(g));
    dump.push(
        "CMIC_EP_TO_CPU_HEADER_SIZE".to_string(),
        reg_read32(dev, regs::EP_TO_CPU_HEADER_SIZE),
    );
    dump
}
