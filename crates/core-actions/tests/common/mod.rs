#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{CommandSpec, Console, DirEntry, DirectoryLister};
use core_config::Config;
use core_keymap::keys;
use core_terminal::{MemorySink, Signal, TerminateError, Terminator};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Records termination requests instead of signalling anything.
#[derive(Clone, Default)]
pub struct RecordingTerminator {
    pub calls: Rc<RefCell<Vec<(u32, Signal)>>>,
    pub fail: bool,
}

impl RecordingTerminator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, pid: u32, signal: Signal) -> Result<(), TerminateError> {
        self.calls.borrow_mut().push((pid, signal));
        if self.fail {
            return Err(TerminateError::Spawn {
                tool: "kill",
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(())
    }
}

/// Directory tree held in memory: path (as typed, without trailing `/`) → entries.
#[derive(Clone, Default)]
pub struct StaticLister {
    dirs: BTreeMap<PathBuf, Vec<DirEntry>>,
}

impl StaticLister {
    pub fn with_dir(mut self, dir: &str, entries: Vec<DirEntry>) -> Self {
        self.dirs.insert(PathBuf::from(dir), entries);
        self
    }
}

impl DirectoryLister for StaticLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let key = PathBuf::from(dir.to_string_lossy().trim_end_matches('/'));
        self.dirs
            .get(&key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))
    }
}

pub struct Harness {
    pub console: Console,
    pub screen: MemorySink,
    pub terminator: RecordingTerminator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let screen = MemorySink::new();
        let terminator = RecordingTerminator::default();
        let console = Console::new(config, screen.clone())
            .with_terminator(terminator.clone())
            .without_lister();
        Self {
            console,
            screen,
            terminator,
        }
    }

    pub fn with_lister(mut self, lister: impl DirectoryLister + 'static) -> Self {
        self.console = self.console.with_lister(lister);
        self
    }

    /// Register a command that records its arguments.
    pub fn recording_command(&mut self, name: &str) -> Rc<RefCell<Vec<Vec<String>>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        self.console
            .commands_mut()
            .register(
                name,
                CommandSpec::new(move |_, args| {
                    sink.borrow_mut().push(args.to_vec());
                    Ok(())
                }),
            )
            .unwrap();
        seen
    }

    /// Feed one chunk per char, the way a terminal delivers typed text.
    pub fn type_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.console.handle_chunk(&ch.to_string()).unwrap();
        }
    }

    pub fn press(&mut self, key: &str) {
        self.console.handle_chunk(key).unwrap();
    }

    pub fn enter(&mut self) {
        self.press(keys::ENTER);
    }

    pub fn text(&self) -> String {
        self.console.buffer().text()
    }

    pub fn cursor(&self) -> usize {
        self.console.buffer().cursor()
    }
}
