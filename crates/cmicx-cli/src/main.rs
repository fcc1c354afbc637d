//! `cmicx`: bring-up and diagnostics for the CMICx packet DMA engine.
//!
//! ```text
//! USAGE:
//!   cmicx --pcie <addr> info            Init the engine and print hardware info
//!   cmicx --pcie <addr> init            Quiesce all attached channels
//!   cmicx --pcie <addr> config ...      Program queue control words
//!   cmicx --pcie <addr> reset           Zero every attached channel's control
//!   cmicx --pcie <addr> dump --chan N   Dump one channel's registers
//!   cmicx --pcie <addr> stop --chan N   Abort one channel
//!   cmicx --pcie <addr> read <reg>      Read a raw register
//!   cmicx --pcie <addr> write <reg> <v> Write a raw register
//!   cmicx --simulate ...                Same, against an in-memory register file
//! ```

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use cmicx_chip::bus::CMIC_BAR_INDEX;
use cmicx_chip::regs::EP_TO_CPU_HEADER_SIZE;
use cmicx_chip::topology::CMC_MAX;
use cmicx_pdma::{
    pdma_ops, DeviceConfig, DeviceContext, MmioRegion, PdmaOps, QueueFlags, RegisterAccess,
    SoftwareRegisters, TracingIrqController,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cmicx", about = "CMICx packet DMA bring-up CLI", version)]
struct Cli {
    /// PCIe address of the switch (e.g. 0000:01:00.0).
    #[arg(long, env = "CMICX_PCIE_ADDR")]
    pcie: Option<String>,

    /// BAR holding the CMIC register space.
    #[arg(long, default_value_t = CMIC_BAR_INDEX)]
    bar: usize,

    /// Run against simulated registers instead of hardware (overrides --pcie).
    #[arg(long)]
    simulate: bool,

    /// Number of groups (CMCs) present.
    #[arg(long, default_value_t = CMC_MAX)]
    groups: usize,

    /// Attached-group bitset (default: every group present).
    #[arg(long, value_parser = parse_u32)]
    attached: Option<u32>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Initialize the engine and print discovered hardware info.
    Info,
    /// Quiesce every attached channel and clear interrupt status.
    Init,
    /// Program control words for the given queues.
    Config {
        /// Receive channel (repeatable).
        #[arg(long)]
        rx: Vec<usize>,
        /// Transmit channel (repeatable).
        #[arg(long)]
        tx: Vec<usize>,
        /// Byte-swap packet data, descriptors and headers.
        #[arg(long)]
        swap: bool,
        /// Chained descriptors instead of continuous mode.
        #[arg(long)]
        chain: bool,
    },
    /// Zero every attached channel's control register.
    Reset,
    /// Dump one channel's registers.
    Dump {
        /// Flat channel index.
        #[arg(long)]
        chan: usize,
    },
    /// Abort one channel and report whether it drained.
    Stop {
        /// Flat channel index.
        #[arg(long)]
        chan: usize,
    },
    /// Read a raw 32-bit register.
    Read {
        /// Register offset (hex with 0x prefix, or decimal).
        #[arg(value_parser = parse_u32)]
        reg: u32,
    },
    /// Write a raw 32-bit register.
    Write {
        /// Register offset (hex with 0x prefix, or decimal).
        #[arg(value_parser = parse_u32)]
        reg: u32,
        /// Value to write.
        #[arg(value_parser = parse_u32)]
        value: u32,
    },
}

fn parse_u32(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = DeviceConfig::new(0).groups(cli.groups);
    if let Some(mask) = cli.attached {
        config = config.attached(mask);
    }
    if let Cmd::Config { rx, tx, swap, chain } = &cli.command {
        let flags = if *swap { QueueFlags::all() } else { QueueFlags::empty() };
        config = config.chain_mode(*chain);
        for &chan in rx {
            config = config.rx_queue(chan, flags);
        }
        for &chan in tx {
            config = config.tx_queue(chan, flags);
        }
    }

    let (regs, window) = open_registers(&cli)?;
    let mut dev = DeviceContext::new(&config, regs, Arc::new(TracingIrqController))
        .context("device configuration rejected")?;
    let ops = pdma_ops(&dev)?;

    match cli.command {
        Cmd::Info => cmd_info(ops.as_ref(), &mut dev),
        Cmd::Init => {
            ops.hw_init(&mut dev);
            println!("Initialized {} channels", dev.num_chans());
        }
        Cmd::Config { .. } => {
            ops.hw_config(&dev);
            println!(
                "Configured {} rx / {} tx queues",
                dev.rx_queues().len(),
                dev.tx_queues().len()
            );
        }
        Cmd::Reset => {
            ops.hw_reset(&mut dev);
            println!("Reset {} channels", dev.num_chans());
        }
        Cmd::Dump { chan } => {
            check_chan(&dev, chan)?;
            print!("{}", ops.chan_reg_dump(&dev, chan));
        }
        Cmd::Stop { chan } => {
            check_chan(&dev, chan)?;
            let out = ops.chan_stop(&mut dev, chan);
            if out.drained {
                println!("ch{chan}: stopped after {} status polls", out.polls);
            } else {
                tracing::warn!("ch{chan}: stop forced with the engine still active");
                println!("ch{chan}: still active after {} polls (forced)", out.polls);
            }
        }
        Cmd::Read { reg } => {
            check_reg(window, reg)?;
            let value = ops.reg_read32(&dev, reg);
            tracing::debug!("raw read {reg:#010x} = {value:#010x}");
            println!("{reg:#010x}: {value:#010x}");
        }
        Cmd::Write { reg, value } => {
            check_reg(window, reg)?;
            tracing::debug!("raw write {reg:#010x} <- {value:#010x}");
            ops.reg_write32(&dev, reg, value);
            println!("{reg:#010x} <- {value:#010x}");
        }
    }

    Ok(())
}

/// Register backend plus the mapped window size (`None` when simulated).
fn open_registers(cli: &Cli) -> Result<(Arc<dyn RegisterAccess>, Option<usize>)> {
    if cli.simulate {
        tracing::info!("Using simulated registers");
        let regs = SoftwareRegisters::new();
        // 4 words of receive packet header, as on shipping parts.
        regs.poke(EP_TO_CPU_HEADER_SIZE, 4);
        return Ok((Arc::new(regs), None));
    }

    let Some(addr) = cli.pcie.as_deref() else {
        bail!("no device: pass --pcie <addr>, set CMICX_PCIE_ADDR, or use --simulate");
    };
    let bar = MmioRegion::from_pcie(addr, cli.bar)
        .with_context(|| format!("mapping BAR{} of {addr}", cli.bar))?;
    tracing::info!("Mapped {} ({} bytes)", bar.path().display(), bar.size());
    let size = bar.size();
    Ok((Arc::new(bar), Some(size)))
}

/// Raw offsets must be aligned and lie inside the mapped window.
fn check_reg(window: Option<usize>, reg: u32) -> Result<()> {
    if reg % 4 != 0 {
        bail!("register offset {reg:#x} is not 32-bit aligned");
    }
    if let Some(size) = window {
        let end = u64::from(reg) + 4;
        if end > size as u64 {
            bail!("register offset {reg:#x} outside the {size:#x}-byte BAR window");
        }
    }
    Ok(())
}

fn check_chan(dev: &DeviceContext, chan: usize) -> Result<()> {
    if chan >= dev.num_chans() {
        bail!("channel {chan} out of range (device has {})", dev.num_chans());
    }
    Ok(())
}

fn cmd_info(ops: &dyn PdmaOps, dev: &mut DeviceContext) {
    let info = ops.hw_init(dev);
    println!("Device        : {} {:#x}", info.name, info.dev_id);
    println!(
        "Groups        : {} x {} channels ({} total)",
        info.num_cmcs, info.cmc_chans, info.num_chans
    );
    println!("Present       : {} groups, {} channels", dev.num_groups(), dev.num_chans());
    println!("DCB size      : rx {} B, tx {} B", info.rx_dcb_size, info.tx_dcb_size);
    println!("Packet header : rx {} B, tx {} B", info.rx_ph_size, info.tx_ph_size);
    for g in 0..dev.num_groups() {
        println!(
            "CMC{g}          : irq {} {}",
            info.group_irq(g),
            if dev.group(g).attached { "attached" } else { "detached" }
        );
    }
    println!("IRQ mask shift: {}", info.intr_mask_shift);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_offsets_outside_window_are_rejected() {
        assert!(check_reg(Some(0x4000), 0x3ffc).is_ok());
        assert!(check_reg(Some(0x4000), 0x4000).is_err());
        assert!(check_reg(Some(0x4000), 0x1801_3150).is_err());
        assert!(check_reg(Some(0x4000), u32::MAX - 3).is_err());
    }

    #[test]
    fn unaligned_offsets_are_rejected() {
        assert!(check_reg(None, 0x2102).is_err());
        assert!(check_reg(None, 0x1801_3150).is_ok());
    }

    #[test]
    fn numbers_parse_as_hex_or_decimal() {
        assert_eq!(parse_u32("0x1a04"), Ok(0x1a04));
        assert_eq!(parse_u32("16"), Ok(16));
        assert!(parse_u32("0xzz").is_err());
    }
}
