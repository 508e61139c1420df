//! Terminal backend abstraction, output sinks and host process capabilities.
//!
//! The console renders inline (no alternate screen): raw mode is the only
//! terminal state it changes, and `TerminalGuard` restores it on drop.

use anyhow::Result;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

pub mod process;
pub mod sink;
pub use process::{Signal, SystemTerminator, TerminateError, Terminator};
pub use sink::{CrosstermSink, MemorySink, OutputSink, SinkOp};

pub trait TerminalBackend {
    /// Unbuffered input without local echo.
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring terminal state restoration even if caller early-returns or panics.
pub struct TerminalGuard<'a> {
    backend: &'a mut dyn TerminalBackend,
    active: bool,
}

impl<'a> TerminalGuard<'a> {
    /// Enter raw mode on `backend` and leave it again when the guard drops.
    pub fn enter(backend: &'a mut dyn TerminalBackend) -> Result<Self> {
        backend.enter()?;
        Ok(Self {
            backend,
            active: true,
        })
    }

    /// Leave early, reporting the error instead of swallowing it in `Drop`.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        self.backend.leave()
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            self.entered = true;
            tracing::debug!(target: "runtime", "raw_mode_enabled");
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            disable_raw_mode()?;
            self.entered = false;
            tracing::debug!(target: "runtime", "raw_mode_disabled");
        }
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl Drop for TerminalGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}
