//! Register model for the CMICx packet DMA (PDMA) engine.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the silicon: register offsets, control/status bit layout,
//! interrupt nibble packing, topology constants, and the host-to-bus
//! address transform.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`topology`] | Group (CMC) / channel counts, sizing and interrupt numbering |
//! | [`regs`] | Per-group and per-channel register offsets and bit definitions |
//! | [`bus`] | PCIe BAR index and DMA address transform |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bus;
pub mod regs;
pub mod topology;
