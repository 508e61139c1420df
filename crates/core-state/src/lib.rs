//! Line buffer state: the uncommitted text, its cursor and the submission history.
//!
//! Every input unit (`char`) occupies exactly one cursor cell; there is no
//! grapheme or width awareness. All mutations keep `0 <= cursor <= len`.
//!
//! This crate is pure state. Mutators report what changed (see [`Insert`]) so
//! the action layer can pick between an incremental write and a full redraw;
//! nothing here touches the terminal.

pub mod history;
pub use history::{History, HistoryCursor};

use tracing::trace;

/// How an insertion changed the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    /// Cursor was at the end; only the new text needs writing.
    Appended,
    /// Text was spliced before existing content; the whole line needs redrawing.
    Spliced,
}

#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    text: Vec<char>,
    cursor: usize,
    history: History,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn cursor_at_end(&self) -> bool {
        self.cursor == self.text.len()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Insert `s` at the cursor and advance the cursor past it.
    pub fn insert_str(&mut self, s: &str) -> Insert {
        let before = self.text.len();
        let kind = if self.cursor_at_end() {
            self.text.extend(s.chars());
            Insert::Appended
        } else {
            let tail = self.text.split_off(self.cursor);
            self.text.extend(s.chars());
            self.text.extend(tail);
            Insert::Spliced
        };
        self.cursor += self.text.len() - before;
        trace!(target: "console.buffer", cursor = self.cursor, len = self.text.len(), ?kind, "insert");
        kind
    }

    /// Remove the char before the cursor. Returns false (and changes nothing)
    /// at cursor 0.
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.text.remove(self.cursor);
        trace!(target: "console.buffer", cursor = self.cursor, len = self.text.len(), "delete_backward");
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Move the cursor to `col`, clamped to the buffer length.
    pub fn set_cursor(&mut self, col: usize) {
        self.cursor = col.min(self.text.len());
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the whole text; the cursor lands at the end.
    pub fn set_text(&mut self, s: &str) {
        self.text = s.chars().collect();
        self.cursor = self.text.len();
    }

    /// Step back through history. Loads the selected entry (cursor at end) and
    /// returns true, or clears the buffer at the oldest boundary and returns false.
    pub fn history_up(&mut self) -> bool {
        let selected = self.history.step_back().map(str::to_owned);
        self.load_history_entry(selected)
    }

    /// Step forward through history; mirror of [`LineBuffer::history_up`].
    pub fn history_down(&mut self) -> bool {
        let selected = self.history.step_forward().map(str::to_owned);
        self.load_history_entry(selected)
    }

    fn load_history_entry(&mut self, entry: Option<String>) -> bool {
        match entry {
            Some(line) => {
                self.set_text(&line);
                true
            }
            None => {
                self.clear();
                false
            }
        }
    }

    /// Finalize the buffer: normalize whitespace, append to history, reset the
    /// buffer and return the committed line.
    pub fn commit(&mut self) -> String {
        let line = normalize_command_line(&self.text());
        self.history.push(line.clone());
        self.clear();
        trace!(target: "console.buffer", len = line.len(), "commit");
        line
    }
}

/// Trim and collapse every internal whitespace run to a single space.
pub fn normalize_command_line(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
