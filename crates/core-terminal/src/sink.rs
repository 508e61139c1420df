//! Output sinks: the only place console actions touch the terminal.
//!
//! Three primitives are enough for single-line editing: write text at the
//! cursor, clear the current line, and move to an absolute column on the
//! current row. `CrosstermSink` queues them as crossterm commands and flushes
//! once per handled event; `MemorySink` replays them onto a small screen model
//! so tests and embedders can inspect what a real terminal would show.

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::cell::RefCell;
use std::io::{self, Stdout, Write, stdout};
use std::rc::Rc;

pub trait OutputSink {
    fn write(&mut self, text: &str) -> io::Result<()>;
    /// Clear the row the cursor is on. The cursor column is left unchanged.
    fn clear_current_line(&mut self) -> io::Result<()>;
    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        (**self).write(text)
    }
    fn clear_current_line(&mut self) -> io::Result<()> {
        (**self).clear_current_line()
    }
    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()> {
        (**self).move_cursor_to_column(col)
    }
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

// -------------------------------------------------------------------------------------------------
// Crossterm sink
// -------------------------------------------------------------------------------------------------
pub struct CrosstermSink<W: Write = Stdout> {
    out: W,
}

impl Default for CrosstermSink<Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl CrosstermSink<Stdout> {
    pub fn stdout() -> Self {
        Self { out: stdout() }
    }
}

impl<W: Write> CrosstermSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputSink for CrosstermSink<W> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        if !text.is_empty() {
            queue!(self.out, Print(text))?;
        }
        Ok(())
    }

    fn clear_current_line(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::CurrentLine))
    }

    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()> {
        let col = u16::try_from(col).unwrap_or(u16::MAX);
        queue!(self.out, MoveToColumn(col))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

// -------------------------------------------------------------------------------------------------
// In-memory sink
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Write(String),
    ClearLine,
    MoveToColumn(usize),
}

#[derive(Debug)]
struct Screen {
    rows: Vec<Vec<char>>,
    col: usize,
    ops: Vec<SinkOp>,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            rows: vec![Vec::new()],
            col: 0,
            ops: Vec::new(),
        }
    }
}

impl Screen {
    fn row(&mut self) -> &mut Vec<char> {
        // rows is never empty
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    fn put(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.rows.push(Vec::new());
                self.col = 0;
            }
            '\r' => self.col = 0,
            _ => {
                let col = self.col;
                let row = self.row();
                if row.len() < col {
                    row.resize(col, ' ');
                }
                if col < row.len() {
                    row[col] = ch;
                } else {
                    row.push(ch);
                }
                self.col += 1;
            }
        }
    }
}

/// Cloneable in-memory sink; clones share one screen.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    screen: Rc<RefCell<Screen>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the row the cursor is on, trailing spaces trimmed.
    pub fn current_line(&self) -> String {
        let screen = self.screen.borrow();
        let row: String = screen
            .rows
            .last()
            .map(|r| r.iter().collect::<String>())
            .unwrap_or_default();
        row.trim_end().to_string()
    }

    pub fn column(&self) -> usize {
        self.screen.borrow().col
    }

    /// Every row written so far joined with `\n`.
    pub fn transcript(&self) -> String {
        let screen = self.screen.borrow();
        screen
            .rows
            .iter()
            .map(|r| r.iter().collect::<String>().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn ops(&self) -> Vec<SinkOp> {
        self.screen.borrow().ops.clone()
    }

    pub fn take_ops(&self) -> Vec<SinkOp> {
        std::mem::take(&mut self.screen.borrow_mut().ops)
    }

    /// Forget everything written so far.
    pub fn reset(&self) {
        *self.screen.borrow_mut() = Screen::default();
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut screen = self.screen.borrow_mut();
        screen.ops.push(SinkOp::Write(text.to_string()));
        for ch in text.chars() {
            screen.put(ch);
        }
        Ok(())
    }

    fn clear_current_line(&mut self) -> io::Result<()> {
        let mut screen = self.screen.borrow_mut();
        screen.ops.push(SinkOp::ClearLine);
        screen.row().clear();
        Ok(())
    }

    fn move_cursor_to_column(&mut self, col: usize) -> io::Result<()> {
        let mut screen = self.screen.borrow_mut();
        screen.ops.push(SinkOp::MoveToColumn(col));
        screen.col = col;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_overwrites_at_column() {
        let mut sink = MemorySink::new();
        sink.write("hello").unwrap();
        sink.move_cursor_to_column(1).unwrap();
        sink.write("a").unwrap();
        assert_eq!(sink.current_line(), "hallo");
        assert_eq!(sink.column(), 2);
    }

    #[test]
    fn memory_sink_clear_keeps_previous_rows() {
        let mut sink = MemorySink::new();
        sink.write("first\r\nsecond").unwrap();
        sink.clear_current_line().unwrap();
        sink.move_cursor_to_column(0).unwrap();
        sink.write("third").unwrap();
        assert_eq!(sink.transcript(), "first\nthird");
    }

    #[test]
    fn memory_sink_clones_share_screen() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write("x").unwrap();
        assert_eq!(sink.current_line(), "x");
        assert_eq!(sink.take_ops(), vec![SinkOp::Write("x".into())]);
        assert!(sink.ops().is_empty());
    }

    #[test]
    fn crossterm_sink_emits_escape_sequences() {
        let mut sink = CrosstermSink::new(Vec::new());
        sink.clear_current_line().unwrap();
        sink.move_cursor_to_column(0).unwrap();
        sink.write("ab").unwrap();
        sink.flush().unwrap();
        let bytes = String::from_utf8(sink.into_inner()).unwrap();
        assert!(bytes.contains("\u{1b}[2K"));
        assert!(bytes.ends_with("ab"));
    }
}
