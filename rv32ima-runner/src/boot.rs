//! Boot image layout and loading: kernel, initramfs, and device tree blob
//! copied verbatim into guest-physical RAM before the hart takes its first
//! step.

use std::fs;
use std::path::Path;

use rv32_core::memmap::FlatMemory;

use crate::error::RunnerError;

pub const RAM_BASE: u32 = 0x8000_0000;
pub const RAM_SIZE: u32 = 128 * 1024 * 1024;
pub const KERNEL_ADDR: u32 = 0x8040_0000;
pub const INITRAMFS_ADDR: u32 = 0x8440_0000;
pub const DTB_ADDR: u32 = 0x8700_0000;

/// Read `path` and copy it into `ram` at `addr`, failing with a
/// [`RunnerError`] rather than panicking on a missing file or an image
/// that overruns the backing RAM.
pub fn load_image(ram: &mut FlatMemory, path: &Path, addr: u32) -> Result<(), RunnerError> {
    let bytes = fs::read(path).map_err(|source| RunnerError::ImageUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    ram.load(addr, &bytes).ok_or_else(|| RunnerError::ImageTooLarge {
        path: path.display().to_string(),
        size: bytes.len(),
        capacity: RAM_SIZE,
        base: RAM_BASE,
    })
}
