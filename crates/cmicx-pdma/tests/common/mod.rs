//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use cmicx_pdma::{
    pdma_ops, DeviceConfig, DeviceContext, IrqController, PdmaOps, SoftwareRegisters,
};

/// One request seen by [`RecordingIrq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqCall {
    Unmask { group: usize, chan: usize, selector: u32, mask: u32 },
    Mask { group: usize, chan: usize, selector: u32, mask: u32 },
}

/// Interrupt controller that records every request.
#[derive(Debug, Default)]
pub struct RecordingIrq {
    calls: Mutex<Vec<IrqCall>>,
}

impl RecordingIrq {
    pub fn calls(&self) -> Vec<IrqCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<IrqCall> {
        self.calls.lock().unwrap().last().copied()
    }
}

impl IrqController for RecordingIrq {
    fn intr_unmask(&self, group: usize, chan: usize, selector: u32, mask: u32) {
        self.calls.lock().unwrap().push(IrqCall::Unmask { group, chan, selector, mask });
    }

    fn intr_mask(&self, group: usize, chan: usize, selector: u32, mask: u32) {
        self.calls.lock().unwrap().push(IrqCall::Mask { group, chan, selector, mask });
    }
}

pub struct Rig {
    pub regs: Arc<SoftwareRegisters>,
    pub irq: Arc<RecordingIrq>,
    pub dev: DeviceContext,
    pub ops: Box<dyn PdmaOps>,
}

pub fn rig(config: &DeviceConfig) -> Rig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let regs = Arc::new(SoftwareRegisters::new());
    let irq = Arc::new(RecordingIrq::default());
    let dev = DeviceContext::new(config, regs.clone(), irq.clone()).expect("valid config");
    let ops = pdma_ops(&dev).expect("ops");
    Rig { regs, irq, dev, ops }
}
