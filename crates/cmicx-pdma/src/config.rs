//! Device topology and queue configuration
//!
//! The owning driver describes which groups are attached, how each queue
//! is bound to a channel, and the byte-swap / descriptor-mode policy. The
//! HAL only reads this; it is validated once when the device context is
//! built.

use bitflags::bitflags;
use cmicx_chip::topology::{group_of, CMC_CHAN, CMC_MAX};

use crate::error::{PdmaError, Result};

bitflags! {
    /// Device-wide DMA flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DevFlags: u32 {
        /// Descriptors are chained explicitly; the engine does not run in
        /// continuous (ring) mode.
        const CHAIN_MODE = 1 << 0;
    }
}

bitflags! {
    /// Per-queue control flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct QueueFlags: u32 {
        /// Byte-swap packet data.
        const PKT_BYTE_SWAP = 1 << 0;
        /// Byte-swap descriptors (and other non-packet structures).
        const OTH_BYTE_SWAP = 1 << 1;
        /// Byte-swap packet headers.
        const HDR_BYTE_SWAP = 1 << 2;
    }
}

/// Direction of a DMA queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Switch to host.
    Rx,
    /// Host to switch.
    Tx,
}

/// One queue bound to a flat channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Flat channel index the queue runs on
    pub chan: usize,
    /// Queue direction
    pub direction: Direction,
    /// Byte-swap policy
    pub flags: QueueFlags,
}

/// Device topology as seen by the owning driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device identifier reported back in the hardware info
    pub dev_id: u32,
    /// Number of groups (CMCs) present, at most [`CMC_MAX`]
    pub num_groups: usize,
    /// Bitset of groups that take part in init / reset sweeps
    pub attached: u32,
    /// Device-wide flags
    pub flags: DevFlags,
    /// Configured queues, receive and transmit
    pub queues: Vec<QueueConfig>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeviceConfig {
    /// All groups present and attached, continuous descriptor mode, no queues.
    #[must_use]
    pub fn new(dev_id: u32) -> Self {
        Self {
            dev_id,
            num_groups: CMC_MAX,
            attached: (1 << CMC_MAX) - 1,
            flags: DevFlags::empty(),
            queues: Vec::new(),
        }
    }

    /// Set the number of groups present.
    #[must_use]
    pub fn groups(mut self, num_groups: usize) -> Self {
        self.num_groups = num_groups;
        self
    }

    /// Set the attached-group bitset.
    #[must_use]
    pub fn attached(mut self, mask: u32) -> Self {
        self.attached = mask;
        self
    }

    /// Enable or disable chained descriptor mode.
    #[must_use]
    pub fn chain_mode(mut self, enabled: bool) -> Self {
        self.flags.set(DevFlags::CHAIN_MODE, enabled);
        self
    }

    /// Add a receive queue on flat channel `chan`.
    #[must_use]
    pub fn rx_queue(self, chan: usize, flags: QueueFlags) -> Self {
        self.queue(chan, Direction::Rx, flags)
    }

    /// Add a transmit queue on flat channel `chan`.
    #[must_use]
    pub fn tx_queue(self, chan: usize, flags: QueueFlags) -> Self {
        self.queue(chan, Direction::Tx, flags)
    }

    fn queue(mut self, chan: usize, direction: Direction, flags: QueueFlags) -> Self {
        self.queues.push(QueueConfig {
            chan,
            direction,
            flags,
        });
        self
    }

    /// Total channels addressable with this topology.
    #[must_use]
    pub const fn num_chans(&self) -> usize {
        self.num_groups * CMC_CHAN
    }

    /// Whether group `g` is attached.
    #[must_use]
    pub const fn is_attached(&self, g: usize) -> bool {
        g < 32 && self.attached & (1 << g) != 0
    }

    /// Check the topology is usable.
    ///
    /// # Errors
    ///
    /// Returns error if the group count is zero or above [`CMC_MAX`], the
    /// attached set names a missing group, a queue sits on a channel
    /// outside the topology or in a detached group, or two queues share a
    /// channel.
    pub fn validate(&self) -> Result<()> {
        if self.num_groups == 0 || self.num_groups > CMC_MAX {
            return Err(PdmaError::invalid_param(format!(
                "group count {} not in 1..={CMC_MAX}",
                self.num_groups
            )));
        }

        let present = (1u32 << self.num_groups) - 1;
        let stray = self.attached & !present;
        if stray != 0 {
            return Err(PdmaError::InvalidGroup {
                group: stray.trailing_zeros() as usize,
                count: self.num_groups,
            });
        }

        let mut used = vec![false; self.num_chans()];
        for q in &self.queues {
            if q.chan >= self.num_chans() {
                return Err(PdmaError::InvalidChannel {
                    chan: q.chan,
                    count: self.num_chans(),
                });
            }
            let group = group_of(q.chan);
            if !self.is_attached(group) {
                return Err(PdmaError::invalid_param(format!(
                    "{:?} queue on channel {} but group {group} is detached",
                    q.direction, q.chan
                )));
            }
            if std::mem::replace(&mut used[q.chan], true) {
                return Err(PdmaError::invalid_param(format!(
                    "channel {} bound to more than one queue",
                    q.chan
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attaches_every_group() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.num_groups, CMC_MAX);
        assert!(cfg.is_attached(0));
        assert!(cfg.is_attached(1));
        assert!(!cfg.is_attached(2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_sets_flags_and_queues() {
        let cfg = DeviceConfig::new(0xb880)
            .chain_mode(true)
            .rx_queue(0, QueueFlags::all())
            .tx_queue(9, QueueFlags::PKT_BYTE_SWAP);
        assert!(cfg.flags.contains(DevFlags::CHAIN_MODE));
        assert_eq!(cfg.queues.len(), 2);
        assert_eq!(cfg.queues[1].direction, Direction::Tx);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_group_counts() {
        assert!(DeviceConfig::new(0).groups(0).validate().is_err());
        assert!(DeviceConfig::new(0).groups(CMC_MAX + 1).validate().is_err());
        let cfg = DeviceConfig::new(0).groups(1).attached(0b11);
        assert!(matches!(
            cfg.validate(),
            Err(PdmaError::InvalidGroup { group: 1, count: 1 })
        ));
    }

    #[test]
    fn rejects_out_of_range_and_detached_queues() {
        let cfg = DeviceConfig::new(0).groups(1).attached(1).rx_queue(8, QueueFlags::empty());
        assert!(matches!(
            cfg.validate(),
            Err(PdmaError::InvalidChannel { chan: 8, count: 8 })
        ));

        let cfg = DeviceConfig::new(0).attached(0b01).tx_queue(12, QueueFlags::empty());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_shared_channel() {
        let cfg = DeviceConfig::new(0)
            .rx_queue(3, QueueFlags::empty())
            .tx_queue(3, QueueFlags::empty());
        assert!(cfg.validate().is_err());
    }
}
