//! The ambient, host-process-only error channel: conditions that exist
//! only because a host process exists at all, and never reach the guest.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to read boot image {path}: {source}")]
    ImageUnreadable { path: String, #[source] source: std::io::Error },

    #[error("boot image {path} is {size} bytes, which does not fit in the {capacity}-byte region at {base:#010x}")]
    ImageTooLarge { path: String, size: usize, capacity: u32, base: u32 },

    #[error("failed to enable terminal raw mode: {0}")]
    TerminalSetup(#[source] std::io::Error),

    #[error(transparent)]
    Fatal(#[from] rv32_core::FatalError),
}
