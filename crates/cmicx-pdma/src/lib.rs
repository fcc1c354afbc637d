//! Packet DMA hardware abstraction for Broadcom CMICx switch chips.
//!
//! The CMICx packet DMA engine moves frames between switch ports and host
//! memory over 16 channels (2 groups × 8). This crate is the register-level
//! layer only: it programs channels, routes interrupt masks, and reports
//! hardware info. Descriptor rings, buffers and packet I/O belong to the
//! owning driver, which reaches this layer through the [`PdmaOps`] table.
//!
//! # Seams
//!
//! ```text
//! owning driver
//!   │  DeviceConfig ──► DeviceContext ◄── RegisterAccess  (MmioRegion | SoftwareRegisters | custom)
//!   │                        ▲        ◄── IrqController   (driver's host interrupt routing)
//!   └── pdma_ops() ──► PdmaOps (CmicxPdma)
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cmicx_pdma::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let bar = Arc::new(MmioRegion::from_pcie("0000:01:00.0", 0)?);
//! let cfg = DeviceConfig::new(0xb880)
//!     .rx_queue(0, QueueFlags::PKT_BYTE_SWAP)
//!     .tx_queue(1, QueueFlags::empty());
//! let mut dev = DeviceContext::new(&cfg, bar, Arc::new(TracingIrqController))?;
//!
//! let ops = pdma_ops(&dev)?;
//! let info = ops.hw_init(&mut dev);
//! ops.hw_config(&dev);
//! println!("{}: {} channels, rx header {} B", info.name, info.num_chans, info.rx_ph_size);
//!
//! ops.chan_setup(&mut dev, 0, 0x1_0000_0000);
//! ops.chan_intr_enable(&mut dev, 0);
//! ops.chan_start(&mut dev, 0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod backend;
pub mod backends;
mod capabilities;
mod channel;
mod config;
mod device;
mod dump;
mod error;
pub mod hw;
pub mod intr;
pub mod io;
mod ops;

/// Register model (re-exported from cmicx-chip).
pub mod chip {
    pub use cmicx_chip::{bus, regs, topology};
}

pub use backend::{AccessKind, IrqController, RegisterAccess, TracingIrqController};
pub use backends::{MmioRegion, SoftwareRegisters};
pub use capabilities::HwInfo;
pub use channel::{ChannelState, StopOutcome};
pub use config::{DevFlags, DeviceConfig, Direction, QueueConfig, QueueFlags};
pub use device::{DeviceContext, GroupCtrl, Queue};
pub use dump::RegisterDump;
pub use error::{PdmaError, Result};
pub use ops::{pdma_ops, CmicxPdma, PdmaOps};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        pdma_ops, ChannelState, DevFlags, DeviceConfig, DeviceContext, HwInfo, IrqController,
        MmioRegion, PdmaError, PdmaOps, QueueFlags, RegisterAccess, Result, SoftwareRegisters,
        StopOutcome, TracingIrqController,
    };
}
