//! Memory-mapped register window
//!
//! The default register accessor: the CMIC register space of a PCIe BAR
//! mapped into the process with `rustix::mm::mmap`, accessed with volatile
//! 32-bit loads and stores.
//!
//! Any file can back the window. On a live system that is
//! `/sys/bus/pci/devices/{addr}/resource{bar}`; tests map a plain file.

use crate::backend::{AccessKind, RegisterAccess};
use crate::error::{PdmaError, Result};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Memory-mapped register window
///
/// Bounds-checked access to a mapped BAR. Unsafe operations are
/// encapsulated here and nowhere else in the crate.
#[derive(Debug)]
pub struct MmioRegion {
    ptr: NonNull<u8>,
    size: usize,
    _file: File,
    path: PathBuf,
}

impl MmioRegion {
    /// Map BAR `bar_index` of the PCIe function at `pcie_address`
    ///
    /// # Errors
    ///
    /// Returns error if the resource file is missing, cannot be opened,
    /// is empty, or the mapping fails.
    pub fn from_pcie(pcie_address: &str, bar_index: usize) -> Result<Self> {
        let path = format!("/sys/bus/pci/devices/{pcie_address}/resource{bar_index}");
        Self::open(path)
    }

    /// Map the whole of `path` as a register window
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing, cannot be opened, is empty,
    /// or the mapping fails.
    ///
    /// # Panics
    ///
    /// Panics if `rustix::mm::mmap` returns a null pointer on success
    /// (never happens per the rustix API contract).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PdmaError::window_not_found(path));
        }

        tracing::debug!("Mapping register window: {}", path.display());

        let file = OpenOptions::new().read(true).write(true).open(path)?;

        // Truncation acceptable: BAR sizes fit in usize on 64-bit (our only target)
        #[allow(clippy::cast_possible_truncation)]
        let size = file.metadata()?.len() as usize;

        if size == 0 {
            return Err(PdmaError::map_failed(format!(
                "{} is empty (device not enabled?)",
                path.display()
            )));
        }

        // SAFETY: mmap is unsafe but the preconditions hold:
        // - the fd was just opened read/write and is kept alive in `_file`
        // - size is non-zero (checked above)
        // - MAP_SHARED so stores reach the device (or file), offset 0
        // - the mapping is released exactly once in Drop
        let ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
            .map_err(|e| PdmaError::map_failed(format!("mmap {}: {e}", path.display())))?;

            NonNull::new(addr.cast::<u8>())
                .expect("rustix mmap returns non-null pointer on success")
        };

        tracing::info!(
            "Mapped {} ({size:#x} bytes at {ptr:p})",
            path.display()
        );

        Ok(Self {
            ptr,
            size,
            _file: file,
            path: path.to_path_buf(),
        })
    }

    /// Get window size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Get the backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check(&self, addr: u32) -> usize {
        let offset = addr as usize;
        assert!(
            offset % 4 == 0 && offset + 4 <= self.size,
            "Register offset {offset:#x} out of bounds (window {:#x})",
            self.size
        );
        offset
    }
}

impl RegisterAccess for MmioRegion {
    /// # Panics
    ///
    /// Panics if `addr` is unaligned or `addr + 4` exceeds the window.
    fn read32(&self, addr: u32) -> u32 {
        let offset = self.check(addr);
        // SAFETY: volatile read from the mapped window.
        // - offset is 4-byte aligned and offset + 4 <= size (checked above)
        // - ptr is valid for size bytes for the lifetime of self
        // - volatile: the hardware may change the value between reads
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };
        tracing::trace!("rd32 {addr:#06x} = {value:#010x}");
        value
    }

    /// # Panics
    ///
    /// Panics if `addr` is unaligned or `addr + 4` exceeds the window.
    fn write32(&self, addr: u32, value: u32) {
        let offset = self.check(addr);
        tracing::trace!("wr32 {addr:#06x} = {value:#010x}");
        // SAFETY: volatile write to the mapped window.
        // - offset is 4-byte aligned and offset + 4 <= size (checked above)
        // - ptr is valid for size bytes for the lifetime of self
        // - volatile: stores have device side effects and must not be elided
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().write_volatile(value);
        }
    }

    fn access_kind(&self) -> AccessKind {
        AccessKind::Mmio
    }
}

impl Drop for MmioRegion {
    fn drop(&mut self) {
        tracing::debug!("Unmapping {}", self.path.display());

        // SAFETY: ptr/size are exactly what mmap returned in open(), and
        // Drop runs at most once.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

// SAFETY: Send - MmioRegion owns the mapping exclusively; moving it between
// threads does not invalidate it.
unsafe impl Send for MmioRegion {}

// SAFETY: Sync - every access is a bounds-checked, aligned volatile 32-bit
// load or store. Serializing register sequences is the owning driver's job,
// as with any MMIO window.
unsafe impl Sync for MmioRegion {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn window(len: usize) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(&vec![0u8; len]).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_back_through_file_backed_window() {
        let file = window(0x4000);
        let region = MmioRegion::open(file.path()).unwrap();
        assert_eq!(region.size(), 0x4000);
        assert_eq!(region.access_kind(), AccessKind::Mmio);

        region.write32(0x2100, 0xdead_beef);
        region.write32(0x3ffc, 7);
        assert_eq!(region.read32(0x2100), 0xdead_beef);
        assert_eq!(region.read32(0x3ffc), 7);
        assert_eq!(region.read32(0x2104), 0);
    }

    #[test]
    fn missing_window_is_reported() {
        let err = MmioRegion::open("/nonexistent/resource0").unwrap_err();
        assert!(matches!(err, PdmaError::WindowNotFound { .. }));
    }

    #[test]
    fn empty_window_is_rejected() {
        let file = window(0);
        let err = MmioRegion::open(file.path()).unwrap_err();
        assert!(matches!(err, PdmaError::MapFailed { .. }));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn access_past_end_panics() {
        let file = window(0x100);
        let region = MmioRegion::open(file.path()).unwrap();
        let _ = region.read32(0x100);
    }

    #[test]
    #[ignore] // Requires hardware
    fn map_live_bar() {
        let addr = std::env::var("CMICX_PCIE_ADDR").unwrap_or_else(|_| "0000:01:00.0".into());
        let region = MmioRegion::from_pcie(&addr, cmicx_chip::bus::CMIC_BAR_INDEX).unwrap();
        println!("Mapped {} bytes", region.size());
    }
}
