//! The non-recoverable error channel.
//!
//! Guest traps (misaligned access, page faults, illegal instructions) are
//! handled entirely inside the hart and never reach Rust's `Result` path -
//! they're architectural state transitions, not failures. A [`FatalError`]
//! is reserved for conditions the modeled machine has no recovery story
//! for at all: these terminate the hart loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("no memory handler registered for physical address {address:#010x}")]
    UnmappedAddress { address: u32 },

    #[error("physical address {bits:#x} produced by Sv32 translation exceeds 32 bits")]
    PhysicalAddressOverflow { bits: u64 },

    #[error("unknown SBI call selector {selector:#x} (a7)")]
    UnknownSbiCall { selector: u32 },

    #[error("page fault while re-fetching trap handler entry at {address:#010x}")]
    DoubleFaultOnTrapEntry { address: u32 },
}
