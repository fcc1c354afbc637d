// SPDX-License-Identifier: AGPL-3.0-only

//! Software (simulated) register backend
//!
//! Implements [`RegisterAccess`] over an in-memory register file. This
//! enables:
//!
//! 1. **CI without hardware**: every HAL operation runs against the same
//!    register map the silicon exposes, so lifecycle, interrupt and config
//!    sequences are verified bit for bit.
//!
//! 2. **Fault modelling**: reads can be scripted per address, e.g. a channel
//!    status that keeps reporting "active" for N polls (or forever).
//!
//! 3. **Sequence inspection**: every write is logged in program order, so
//!    pulses such as the receive-buffer release (0 then 1) are observable.
//!
//! Unwritten registers read as zero. Registers are plain storage; no
//! write-one-to-clear or self-clearing behaviour is modelled.

use crate::backend::{AccessKind, RegisterAccess};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// In-memory CMIC register file.
#[derive(Debug, Default)]
pub struct SoftwareRegisters {
    inner: Mutex<RegisterFile>,
}

#[derive(Debug, Default)]
struct RegisterFile {
    values: HashMap<u32, u32>,
    /// Values returned by upcoming reads before falling back to `values`
    scripted: HashMap<u32, VecDeque<u32>>,
    reads: HashMap<u32, u64>,
    writes: Vec<(u32, u32)>,
}

impl SoftwareRegisters {
    /// Create an empty register file (all registers read as zero).
    pub fn new() -> Self {
        Self::default()
    }

    fn file(&self) -> MutexGuard<'_, RegisterFile> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current stored value of `addr`, without counting a read.
    pub fn peek(&self, addr: u32) -> u32 {
        self.file().values.get(&addr).copied().unwrap_or(0)
    }

    /// Store `value` at `addr` without logging a write.
    ///
    /// Models state the hardware sets on its own (status, counters,
    /// capability registers).
    pub fn poke(&self, addr: u32, value: u32) {
        self.file().values.insert(addr, value);
    }

    /// Queue values returned by the next reads of `addr`, in order.
    ///
    /// Once the queue drains, reads fall back to the stored value.
    pub fn script_reads(&self, addr: u32, values: impl IntoIterator<Item = u32>) {
        self.file()
            .scripted
            .entry(addr)
            .or_default()
            .extend(values);
    }

    /// Number of reads issued to `addr` so far.
    pub fn read_count(&self, addr: u32) -> u64 {
        self.file().reads.get(&addr).copied().unwrap_or(0)
    }

    /// All logged writes, in program order.
    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.file().writes.clone()
    }

    /// Values written to `addr`, in program order.
    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.file()
            .writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Forget logged writes and read counts; stored values are kept.
    pub fn clear_log(&self) {
        let mut file = self.file();
        file.writes.clear();
        file.reads.clear();
    }
}

impl RegisterAccess for SoftwareRegisters {
    fn read32(&self, addr: u32) -> u32 {
        let mut file = self.file();
        *file.reads.entry(addr).or_insert(0) += 1;
        let scripted = file.scripted.get_mut(&addr).and_then(VecDeque::pop_front);
        let value = scripted.unwrap_or_else(|| file.values.get(&addr).copied().unwrap_or(0));
        trace!("sim rd32 {addr:#06x} = {value:#010x}");
        value
    }

    fn write32(&self, addr: u32, value: u32) {
        trace!("sim wr32 {addr:#06x} = {value:#010x}");
        let mut file = self.file();
        file.values.insert(addr, value);
        file.writes.push((addr, value));
    }

    fn access_kind(&self) -> AccessKind {
        AccessKind::Software
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_registers_read_zero() {
        let regs = SoftwareRegisters::new();
        assert_eq!(regs.read32(0x2100), 0);
        assert_eq!(regs.read_count(0x2100), 1);
    }

    #[test]
    fn writes_are_stored_and_logged() {
        let regs = SoftwareRegisters::new();
        regs.write32(0x1a04, 0);
        regs.write32(0x1a04, 1);
        regs.poke(0x0004, 0x3);
        assert_eq!(regs.read32(0x1a04), 1);
        assert_eq!(regs.writes_to(0x1a04), vec![0, 1]);
        // poke is silent
        assert_eq!(regs.writes().len(), 2);
        assert_eq!(regs.peek(0x0004), 3);
    }

    #[test]
    fn scripted_reads_take_precedence_then_drain() {
        let regs = SoftwareRegisters::new();
        regs.poke(0x2114, 0);
        regs.script_reads(0x2114, [2, 2, 2]);
        let seen: Vec<u32> = (0..5).map(|_| regs.read32(0x2114)).collect();
        assert_eq!(seen, vec![2, 2, 2, 0, 0]);
        assert_eq!(regs.read_count(0x2114), 5);
    }

    #[test]
    fn clear_log_keeps_values() {
        let regs = SoftwareRegisters::new();
        regs.write32(0x10, 5);
        let _ = regs.read32(0x10);
        regs.clear_log();
        assert!(regs.writes().is_empty());
        assert_eq!(regs.read_count(0x10), 0);
        assert_eq!(regs.peek(0x10), 5);
    }
}
