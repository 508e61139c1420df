//! Frame writer: batches primitive line operations and replays them onto an
//! [`OutputSink`] in one pass.
//!
//! Design invariants:
//! * Commands preserve ordering; the sink is flushed once at the end.
//! * Columns are absolute on the current row; callers ensure bounds.
//! * A writer owns no state beyond its command list; it is built per action.

use core_terminal::OutputSink;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ClearLine,
    MoveToColumn(usize),
    Print(String),
}

#[derive(Debug, Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn clear_line(&mut self) -> &mut Self {
        self.cmds.push(Command::ClearLine);
        self
    }

    pub fn move_to_column(&mut self, col: usize) -> &mut Self {
        self.cmds.push(Command::MoveToColumn(col));
        self
    }

    pub fn print<S: Into<String>>(&mut self, s: S) -> &mut Self {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
        self
    }

    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn flush(self, sink: &mut dyn OutputSink) -> io::Result<()> {
        for c in self.cmds {
            match c {
                Command::ClearLine => sink.clear_current_line()?,
                Command::MoveToColumn(col) => sink.move_cursor_to_column(col)?,
                Command::Print(s) => sink.write(&s)?,
            }
        }
        sink.flush()
    }
}
