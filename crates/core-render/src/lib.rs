//! Line rendering for the console prompt.
//!
//! The prompt occupies a single terminal row and the buffer is drawn from
//! column 0, so the terminal column of the cursor equals its buffer offset.
//! Every helper here builds a [`Writer`] frame; the caller flushes it onto the
//! session's sink right after the state mutation that produced it, keeping
//! output ordered with state changes.
//!
//! Frames:
//! - `append`: incremental write when text was added at the end of the line.
//! - `redraw_line`: clear, rewrite the full buffer, reposition the cursor.
//! - `move_cursor`: reposition only.
//! - `clear_line`: wipe the row and park at column 0.
//! - `info_below`: print a block of text below the prompt, then redraw the
//!   buffer on a fresh row (completion listings, help).

pub mod writer;
pub use writer::{Command, Writer};

pub const LINE_BREAK: &str = "\r\n";

pub fn append(text: &str) -> Writer {
    let mut w = Writer::new();
    w.print(text);
    w
}

pub fn redraw_line(text: &str, cursor: usize) -> Writer {
    let mut w = Writer::new();
    w.clear_line().move_to_column(0).print(text).move_to_column(cursor);
    w
}

pub fn move_cursor(cursor: usize) -> Writer {
    let mut w = Writer::new();
    w.move_to_column(cursor);
    w
}

pub fn clear_line() -> Writer {
    let mut w = Writer::new();
    w.clear_line().move_to_column(0);
    w
}

pub fn line_break() -> Writer {
    let mut w = Writer::new();
    w.print(LINE_BREAK);
    w
}

/// Show `info` on its own rows below the prompt, then redraw `text` with the
/// cursor at `cursor`.
pub fn info_below(info: &str, text: &str, cursor: usize) -> Writer {
    let mut w = Writer::new();
    w.clear_line()
        .move_to_column(0)
        .print(format!("{LINE_BREAK}{info}{LINE_BREAK}{LINE_BREAK}"))
        .print(text)
        .move_to_column(cursor);
    w
}

/// Print a message on its own row without touching the buffer. Used for
/// dispatcher output, which always follows a line break.
pub fn message(msg: &str) -> Writer {
    let mut w = Writer::new();
    w.print(msg);
    if !msg.ends_with(LINE_BREAK) {
        w.print(LINE_BREAK);
    }
    w
}
