//! Host entry point: load the kernel/initramfs/DTB into guest-physical
//! RAM, boot a hart at the Linux RISC-V entry point, and pump `step()`
//! until the guest calls the SBI `SHUTDOWN` call or a fatal error occurs.
//!
//! No flags are required; the three boot images are read from the
//! current directory. Set `RUST_LOG` to control log verbosity.

mod boot;
mod error;
mod terminal;

use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rv32_core::memmap::{FlatMemory, MemoryMap};
use rv32ima::{Hart, SystemClock};

use boot::{DTB_ADDR, INITRAMFS_ADDR, KERNEL_ADDR, RAM_BASE, RAM_SIZE};
use terminal::{RawModeGuard, TerminalIo};

const TIMEBASE_FREQ_HZ: u64 = 10_000_000;

fn run() -> Result<(), error::RunnerError> {
    env_logger::init();

    let mut ram = FlatMemory::new(RAM_BASE, RAM_SIZE);
    boot::load_image(&mut ram, Path::new("kernel"), KERNEL_ADDR)?;
    boot::load_image(&mut ram, Path::new("initramfs"), INITRAMFS_ADDR)?;
    boot::load_image(&mut ram, Path::new("dtb"), DTB_ADDR)?;

    let mut mem = MemoryMap::new();
    mem.register(Box::new(ram));

    let running = Arc::new(AtomicBool::new(true));
    let io = TerminalIo::new(Arc::clone(&running));
    let mut hart = Hart::new(TIMEBASE_FREQ_HZ, io, SystemClock::new());
    hart.boot(KERNEL_ADDR, DTB_ADDR);

    let _raw_mode = RawModeGuard::enable()?;

    log::info!("booting kernel at {KERNEL_ADDR:#010x}, dtb at {DTB_ADDR:#010x}");

    while running.load(Ordering::SeqCst) {
        if let Err(err) = hart.step(&mut mem) {
            log::error!("fatal emulator error: {err}");
            return Err(error::RunnerError::Fatal(err));
        }
    }

    log::info!("guest requested shutdown");
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
