//! Terminal adaptation: raw mode for the hart's lifetime, non-blocking
//! getchar, and the shared shutdown flag the SBI `SHUTDOWN` call sets.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal;

use rv32ima::HostIo;

use crate::error::RunnerError;

/// Puts the host terminal into raw mode on construction and restores it on
/// drop, including on panic - the idiomatic replacement for "restore at
/// every exit point".
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self, RunnerError> {
        terminal::enable_raw_mode().map_err(RunnerError::TerminalSetup)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub struct TerminalIo {
    running: Arc<AtomicBool>,
}

impl TerminalIo {
    #[must_use]
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self { running }
    }
}

impl HostIo for TerminalIo {
    fn putchar(&mut self, byte: u8) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let _ = lock.write_all(&[byte]);
        let _ = lock.flush();
    }

    fn getchar(&mut self) -> i32 {
        match event::poll(Duration::from_millis(0)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => match key.code {
                    KeyCode::Char(c) => i32::from(c as u8),
                    KeyCode::Enter => i32::from(b'\r'),
                    KeyCode::Backspace => i32::from(0x7f_u8),
                    _ => -1,
                },
                _ => -1,
            },
            _ => -1,
        }
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
