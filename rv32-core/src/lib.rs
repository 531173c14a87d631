//! Shared, machine-independent plumbing for the RV32IMA emulator: bit-range
//! helpers, the physical memory map, and the fatal-error channel.

pub mod bits;
pub mod error;
pub mod memmap;

pub use error::FatalError;
pub use memmap::{FlatMemory, MemoryMap, MemoryMapHandler};
