//! Process termination capability.
//!
//! Termination is a single attempt that returns a `Result`; callers report
//! failures and never retry. When the target is the current process the
//! terminal is taken out of raw mode first, because a killed process gets no
//! chance to run its own cleanup.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled};
use std::fmt;
use std::process::{Command, ExitStatus};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Hup,
    Int,
    Quit,
    Kill,
    Usr1,
    Usr2,
    Term,
}

impl Signal {
    pub const ALL: [Signal; 7] = [
        Signal::Hup,
        Signal::Int,
        Signal::Quit,
        Signal::Kill,
        Signal::Usr1,
        Signal::Usr2,
        Signal::Term,
    ];

    /// Name without the `SIG` prefix, as accepted by `kill -s`.
    pub fn name(self) -> &'static str {
        match self {
            Signal::Hup => "HUP",
            Signal::Int => "INT",
            Signal::Quit => "QUIT",
            Signal::Kill => "KILL",
            Signal::Usr1 => "USR1",
            Signal::Usr2 => "USR2",
            Signal::Term => "TERM",
        }
    }

    /// POSIX signal number.
    pub fn number(self) -> i32 {
        match self {
            Signal::Hup => 1,
            Signal::Int => 2,
            Signal::Quit => 3,
            Signal::Kill => 9,
            Signal::Usr1 => 10,
            Signal::Usr2 => 12,
            Signal::Term => 15,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIG{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal `{0}`")]
pub struct UnknownSignal(pub String);

impl FromStr for Signal {
    type Err = UnknownSignal;

    /// Accepts `KILL`, `SIGKILL`, `kill` or the number `9`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
        Signal::ALL
            .into_iter()
            .find(|sig| sig.name() == bare || sig.number().to_string() == bare)
            .ok_or_else(|| UnknownSignal(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum TerminateError {
    #[error("failed to launch `{tool}`: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("`{tool}` could not signal pid {pid} ({status}): {stderr}")]
    Rejected {
        tool: &'static str,
        pid: u32,
        status: ExitStatus,
        stderr: String,
    },
}

/// Capability: deliver `signal` to process `pid`.
pub trait Terminator {
    fn terminate(&self, pid: u32, signal: Signal) -> Result<(), TerminateError>;
}

impl<T: Terminator + ?Sized> Terminator for Box<T> {
    fn terminate(&self, pid: u32, signal: Signal) -> Result<(), TerminateError> {
        (**self).terminate(pid, signal)
    }
}

/// Host implementation: `kill -s <SIG>` on Unix, `taskkill /F` on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTerminator;

impl SystemTerminator {
    pub fn new() -> Self {
        Self
    }

    #[cfg(unix)]
    fn command(pid: u32, signal: Signal) -> (&'static str, Command) {
        let mut cmd = Command::new("kill");
        cmd.arg("-s").arg(signal.name()).arg(pid.to_string());
        ("kill", cmd)
    }

    #[cfg(windows)]
    fn command(pid: u32, _signal: Signal) -> (&'static str, Command) {
        let mut cmd = Command::new("taskkill");
        cmd.arg("/PID").arg(pid.to_string()).arg("/T").arg("/F");
        ("taskkill", cmd)
    }
}

impl Terminator for SystemTerminator {
    fn terminate(&self, pid: u32, signal: Signal) -> Result<(), TerminateError> {
        let is_self = pid == std::process::id();
        let restore_raw = is_self && is_raw_mode_enabled().unwrap_or(false);
        if restore_raw {
            let _ = disable_raw_mode();
        }
        debug!(target: "console.process", pid, signal = signal.name(), is_self, "terminate");

        let (tool, mut cmd) = Self::command(pid, signal);
        let result = match cmd.output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(TerminateError::Rejected {
                tool,
                pid,
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
            Err(source) => Err(TerminateError::Spawn { tool, source }),
        };

        if let Err(e) = &result {
            warn!(target: "console.process", pid, signal = signal.name(), error = %e, "terminate_failed");
            if restore_raw {
                let _ = enable_raw_mode();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signal_spellings() {
        assert_eq!("KILL".parse::<Signal>(), Ok(Signal::Kill));
        assert_eq!("sigint".parse::<Signal>(), Ok(Signal::Int));
        assert_eq!("15".parse::<Signal>(), Ok(Signal::Term));
        assert!("SIGBOGUS".parse::<Signal>().is_err());
    }

    #[test]
    fn display_uses_sig_prefix() {
        assert_eq!(Signal::Kill.to_string(), "SIGKILL");
    }

    #[cfg(unix)]
    #[test]
    fn signalling_a_missing_process_is_reported() {
        // pid 0x7fff_fff0 is far above any default pid_max
        let err = SystemTerminator::new()
            .terminate(0x7fff_fff0, Signal::Term)
            .unwrap_err();
        assert!(
            matches!(
                err,
                TerminateError::Rejected { .. } | TerminateError::Spawn { .. }
            ),
            "unexpected error: {err}"
        );
    }
}
