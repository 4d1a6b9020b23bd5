//! Memory-mapped register access for SoC GPIO banks
//!
//! Maps a physical register window through `/dev/gpiomem` when the kernel
//! provides it (no root needed) and falls back to `/dev/mem`. All register
//! traffic is 32-bit volatile; the GPIO blocks on both Amlogic and Rockchip
//! SoCs are 32-bit only.
//!
//! # Safety
//!
//! Mapping physical memory bypasses every kernel abstraction. A [`RegWindow`]
//! must only ever cover an MMIO register block, never RAM, and the caller is
//! responsible for picking addresses that belong to the GPIO controller.

use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use thiserror::Error;

/// Errors from mapping a register window.
#[derive(Debug, Error)]
pub enum MmioError {
    /// Neither /dev/gpiomem nor /dev/mem could be opened.
    #[error("cannot open {gpiomem} or {devmem} (need root or gpio group): {source}")]
    Open {
        /// The gpiomem path that was tried first
        gpiomem: &'static str,
        /// The devmem fallback path
        devmem: &'static str,
        /// Error from the /dev/mem attempt
        #[source]
        source: std::io::Error,
    },

    /// The mmap call itself failed.
    #[error("mmap of {size:#x} bytes at physical {address:#x} failed: {source}")]
    Map {
        /// Physical base address requested
        address: u64,
        /// Requested window size
        size: usize,
        /// errno from mmap
        #[source]
        source: std::io::Error,
    },
}

const GPIOMEM: &str = "/dev/gpiomem";
const DEVMEM: &str = "/dev/mem";

/// One mapped physical register window.
pub struct RegWindow {
    ptr: *mut u32,
    map_size: usize,
    page_offset: usize,
    phys_addr: u64,
}

impl RegWindow {
    /// Map `size` bytes at physical `phys_addr`, preferring `/dev/gpiomem`.
    pub fn map(phys_addr: u64, size: usize) -> Result<Self, MmioError> {
        let file = open_mem_device()?;
        Self::map_with(&file, phys_addr, size)
    }

    /// Map through an already opened memory device (board setup opens the
    /// device once and maps several windows from it).
    pub fn map_with(file: &File, phys_addr: u64, size: usize) -> Result<Self, MmioError> {
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let page_mask = page_size - 1;
        let page_offset = (phys_addr as usize) & page_mask;
        let aligned_addr = phys_addr & !(page_mask as u64);
        let map_size = (size + page_offset + page_mask) & !page_mask;

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned_addr as libc::off_t,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(MmioError::Map {
                address: phys_addr,
                size,
                source: std::io::Error::last_os_error(),
            });
        }

        log::debug!("mapped {map_size:#x} bytes at physical {aligned_addr:#x}");
        Ok(RegWindow {
            ptr: unsafe { (ptr as *mut u8).add(page_offset) } as *mut u32,
            map_size,
            page_offset,
            phys_addr,
        })
    }

    /// Read the 32-bit register at word offset `reg` (offsets count words,
    /// matching how the datasheets list the blocks).
    #[inline]
    pub fn read(&self, reg: usize) -> u32 {
        debug_assert!(self.page_offset + (reg + 1) * 4 <= self.map_size);
        unsafe { core::ptr::read_volatile(self.ptr.add(reg)) }
    }

    /// Write the 32-bit register at word offset `reg`.
    #[inline]
    pub fn write(&self, reg: usize, value: u32) {
        debug_assert!(self.page_offset + (reg + 1) * 4 <= self.map_size);
        unsafe { core::ptr::write_volatile(self.ptr.add(reg), value) }
    }

    /// Read-modify-write: clear `mask` then set `bits` in the register.
    #[inline]
    pub fn update(&self, reg: usize, mask: u32, bits: u32) {
        let value = (self.read(reg) & !mask) | (bits & mask);
        self.write(reg, value);
    }

    /// Set the bit at `bit` in the register.
    #[inline]
    pub fn set_bit(&self, reg: usize, bit: u32) {
        self.write(reg, self.read(reg) | (1 << bit));
    }

    /// Clear the bit at `bit` in the register.
    #[inline]
    pub fn clear_bit(&self, reg: usize, bit: u32) {
        self.write(reg, self.read(reg) & !(1 << bit));
    }

    /// The physical base address this window covers.
    pub fn phys_addr(&self) -> u64 {
        self.phys_addr
    }
}

impl Drop for RegWindow {
    fn drop(&mut self) {
        let base = unsafe { (self.ptr as *mut u8).sub(self.page_offset) };
        unsafe {
            libc::munmap(base as *mut libc::c_void, self.map_size);
        }
    }
}

// MMIO registers have no aliasing model the borrow checker could track;
// register-level races are the hardware's own semantics.
unsafe impl Send for RegWindow {}
unsafe impl Sync for RegWindow {}

/// Open the memory device, preferring the unprivileged gpiomem node.
pub fn open_mem_device() -> Result<File, MmioError> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::OpenOptionsExt;

    if Path::new(GPIOMEM).exists() {
        if let Ok(f) = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(GPIOMEM)
        {
            log::debug!("using {GPIOMEM}");
            return Ok(f);
        }
    }

    // O_SYNC keeps the mapping uncached, which MMIO requires.
    OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(DEVMEM)
        .map_err(|source| MmioError::Open {
            gpiomem: GPIOMEM,
            devmem: DEVMEM,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mapping real register windows needs root and board hardware; the
    // anonymous-page variant exercises the pointer arithmetic and the
    // volatile accessors without either.
    fn anon_window(size: usize) -> RegWindow {
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        assert_ne!(ptr, libc::MAP_FAILED);
        RegWindow {
            ptr: ptr as *mut u32,
            map_size: size,
            page_offset: 0,
            phys_addr: 0,
        }
    }

    #[test]
    fn read_write_round_trip() {
        let w = anon_window(4096);
        w.write(3, 0xdead_beef);
        assert_eq!(w.read(3), 0xdead_beef);
        assert_eq!(w.read(4), 0);
    }

    #[test]
    fn bit_helpers() {
        let w = anon_window(4096);
        w.write(0, 0);
        w.set_bit(0, 17);
        assert_eq!(w.read(0), 1 << 17);
        w.clear_bit(0, 17);
        assert_eq!(w.read(0), 0);
    }

    #[test]
    fn update_masks_correctly() {
        let w = anon_window(4096);
        w.write(1, 0xffff_0000);
        w.update(1, 0x0000_00ff, 0x0000_0042);
        assert_eq!(w.read(1), 0xffff_0042);
    }
}
