//! Register backend implementations
//!
//! Two backends available:
//! - **Mmio**: memory-mapped PCIe BAR (default accessor on real hardware)
//! - **Software**: in-memory register file (CI, fault modelling, bring-up
//!   without a switch)
//!
//! Drivers with unusual plumbing implement
//! [`RegisterAccess`](crate::RegisterAccess) themselves and install it as
//! the device context's override.

pub mod mmio;
pub mod software;

pub use mmio::MmioRegion;
pub use software::SoftwareRegisters;
