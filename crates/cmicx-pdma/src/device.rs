//! Device context shared between the owning driver and the HAL
//!
//! The owning driver builds the context before calling into the HAL and
//! owns its lifetime. The HAL reads topology from it and writes three
//! things back: the per-group cached interrupt mask, per-channel lifecycle
//! state, and the hardware info discovered by `hw_init`.

use std::sync::Arc;

use cmicx_chip::topology::{group_of, local_of, CMC_CHAN};

use crate::backend::{IrqController, RegisterAccess};
use crate::capabilities::HwInfo;
use crate::channel::ChannelState;
use crate::config::{DevFlags, DeviceConfig, Direction, QueueFlags};
use crate::error::Result;

/// A queue bound to a channel, as the HAL sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queue {
    /// Group owning the channel
    pub group_id: usize,
    /// Flat channel index
    pub chan_id: usize,
}

/// Per-group state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCtrl {
    /// Whether the group takes part in init / reset sweeps
    pub attached: bool,
    /// Cached interrupt mask, unshifted (logical bit positions)
    pub irq_mask: u32,
    /// Byte-swap policy of each local channel's queue
    pub que_ctrl: [QueueFlags; CMC_CHAN],
    /// Lifecycle state of each local channel
    pub chan_state: [ChannelState; CMC_CHAN],
}

impl GroupCtrl {
    fn new(attached: bool) -> Self {
        Self {
            attached,
            irq_mask: 0,
            que_ctrl: [QueueFlags::empty(); CMC_CHAN],
            chan_state: [ChannelState::Idle; CMC_CHAN],
        }
    }
}

/// Device context
///
/// Holds topology, cached interrupt state and the register / interrupt
/// backends for one device.
#[derive(Debug)]
pub struct DeviceContext {
    dev_id: u32,
    flags: DevFlags,
    pub(crate) groups: Vec<GroupCtrl>,
    rx_queues: Vec<Queue>,
    tx_queues: Vec<Queue>,
    ctrl: Arc<dyn RegisterAccess>,
    dev_access: Option<Arc<dyn RegisterAccess>>,
    irq: Arc<dyn IrqController>,
    pub(crate) info: Option<HwInfo>,
}

impl DeviceContext {
    /// Build a device context
    ///
    /// `regs` is the default (memory-mapped) register accessor; `irq`
    /// routes interrupt mask / unmask requests to the host.
    ///
    /// # Errors
    ///
    /// Returns error if `config` fails [`DeviceConfig::validate`].
    pub fn new(
        config: &DeviceConfig,
        regs: Arc<dyn RegisterAccess>,
        irq: Arc<dyn IrqController>,
    ) -> Result<Self> {
        config.validate()?;

        let mut groups: Vec<GroupCtrl> = (0..config.num_groups)
            .map(|g| GroupCtrl::new(config.is_attached(g)))
            .collect();

        let mut rx_queues = Vec::new();
        let mut tx_queues = Vec::new();
        for q in &config.queues {
            let queue = Queue {
                group_id: group_of(q.chan),
                chan_id: q.chan,
            };
            groups[queue.group_id].que_ctrl[local_of(q.chan)] = q.flags;
            match q.direction {
                Direction::Rx => rx_queues.push(queue),
                Direction::Tx => tx_queues.push(queue),
            }
        }

        tracing::debug!(
            "Device {:#x}: {} groups (attached {:#x}), {} rx / {} tx queues, {} backend",
            config.dev_id,
            config.num_groups,
            config.attached,
            rx_queues.len(),
            tx_queues.len(),
            regs.access_kind()
        );

        Ok(Self {
            dev_id: config.dev_id,
            flags: config.flags,
            groups,
            rx_queues,
            tx_queues,
            ctrl: regs,
            dev_access: None,
            irq,
            info: None,
        })
    }

    /// Install (or clear) a device-specific register accessor.
    ///
    /// When present it takes precedence over the default accessor for
    /// every register read and write.
    pub fn set_reg_override(&mut self, access: Option<Arc<dyn RegisterAccess>>) {
        if let Some(a) = &access {
            tracing::info!(
                "Device {:#x}: register override installed ({})",
                self.dev_id,
                a.access_kind()
            );
        }
        self.dev_access = access;
    }

    /// Register accessor in effect: the override if installed, else the default.
    pub fn reg_access(&self) -> &dyn RegisterAccess {
        self.dev_access.as_deref().unwrap_or(&*self.ctrl)
    }

    /// Interrupt routing primitives.
    pub fn irq_controller(&self) -> &dyn IrqController {
        &*self.irq
    }

    /// Device identifier.
    #[must_use]
    pub const fn dev_id(&self) -> u32 {
        self.dev_id
    }

    /// Device-wide flags.
    #[must_use]
    pub const fn flags(&self) -> DevFlags {
        self.flags
    }

    /// Number of groups present.
    #[must_use]
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Number of channels addressable.
    #[must_use]
    pub fn num_chans(&self) -> usize {
        self.groups.len() * CMC_CHAN
    }

    /// Per-group state.
    ///
    /// # Panics
    ///
    /// Panics if `g` is not a group of this device.
    #[must_use]
    pub fn group(&self, g: usize) -> &GroupCtrl {
        &self.groups[g]
    }

    /// Cached interrupt mask of group `g`.
    ///
    /// # Panics
    ///
    /// Panics if `g` is not a group of this device.
    #[must_use]
    pub fn irq_mask(&self, g: usize) -> u32 {
        self.groups[g].irq_mask
    }

    /// Lifecycle state of flat channel `chan`.
    ///
    /// # Panics
    ///
    /// Panics if `chan` is not a channel of this device.
    #[must_use]
    pub fn chan_state(&self, chan: usize) -> ChannelState {
        self.groups[group_of(chan)].chan_state[local_of(chan)]
    }

    pub(crate) fn set_chan_state(&mut self, chan: usize, state: ChannelState) {
        let slot = &mut self.groups[group_of(chan)].chan_state[local_of(chan)];
        if *slot != state {
            tracing::debug!("ch{chan}: {:?} -> {:?}", *slot, state);
            *slot = state;
        }
    }

    /// Configured receive queues.
    #[must_use]
    pub fn rx_queues(&self) -> &[Queue] {
        &self.rx_queues
    }

    /// Configured transmit queues.
    #[must_use]
    pub fn tx_queues(&self) -> &[Queue] {
        &self.tx_queues
    }

    /// Hardware info, once `hw_init` has run.
    #[must_use]
    pub const fn info(&self) -> Option<&HwInfo> {
        self.info.as_ref()
    }
}
