//! core-keymap: raw key classification for the console input loop.
//!
//! Design principles:
//! - A key identifier is the literal char sequence a terminal emits for one
//!   keystroke (`\x1b[A` for the up arrow, `\r` for enter).
//! - The input layer delivers every keystroke or escape sequence as one
//!   atomic chunk, so resolution is an exact whole-chunk match. There is no
//!   prefix buffering and no timeout handling.
//! - Generic over the bound value so the action layer decides what a binding
//!   is; this crate never runs anything.
//! - No side effects: logging only at TRACE, and only key names or lengths,
//!   never the typed text itself.

use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

// -------------------------------------------------------------------------------------------------
// Well-known key sequences
// -------------------------------------------------------------------------------------------------
pub mod keys {
    pub const INTERRUPT: &str = "\u{0003}"; // Ctrl+C
    pub const ESCAPE: &str = "\u{001B}";
    pub const BACKSPACE: &str = "\u{007F}";
    pub const CTRL_H: &str = "\u{0008}"; // backspace on Windows consoles
    pub const TAB: &str = "\u{0009}";
    pub const ENTER: &str = "\u{000D}";
    pub const UP: &str = "\u{001B}[A";
    pub const DOWN: &str = "\u{001B}[B";
    pub const RIGHT: &str = "\u{001B}[C";
    pub const LEFT: &str = "\u{001B}[D";
    pub const CTRL_Q: &str = "\u{0011}";
}

/// Named keys the console assigns meaning to by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Interrupt,
    Escape,
    Backspace,
    CtrlH,
    Tab,
    Enter,
    Up,
    Down,
    Left,
    Right,
}

impl NamedKey {
    pub const ALL: [NamedKey; 10] = [
        NamedKey::Interrupt,
        NamedKey::Escape,
        NamedKey::Backspace,
        NamedKey::CtrlH,
        NamedKey::Tab,
        NamedKey::Enter,
        NamedKey::Up,
        NamedKey::Down,
        NamedKey::Left,
        NamedKey::Right,
    ];

    pub fn sequence(self) -> &'static str {
        match self {
            NamedKey::Interrupt => keys::INTERRUPT,
            NamedKey::Escape => keys::ESCAPE,
            NamedKey::Backspace => keys::BACKSPACE,
            NamedKey::CtrlH => keys::CTRL_H,
            NamedKey::Tab => keys::TAB,
            NamedKey::Enter => keys::ENTER,
            NamedKey::Up => keys::UP,
            NamedKey::Down => keys::DOWN,
            NamedKey::Left => keys::LEFT,
            NamedKey::Right => keys::RIGHT,
        }
    }

    pub fn from_sequence(chunk: &str) -> Option<NamedKey> {
        Self::ALL.into_iter().find(|k| k.sequence() == chunk)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NamedKey::Interrupt => "interrupt",
            NamedKey::Escape => "escape",
            NamedKey::Backspace => "backspace",
            NamedKey::CtrlH => "ctrl_h",
            NamedKey::Tab => "tab",
            NamedKey::Enter => "enter",
            NamedKey::Up => "up",
            NamedKey::Down => "down",
            NamedKey::Left => "left",
            NamedKey::Right => "right",
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Printable filter
// -------------------------------------------------------------------------------------------------

/// True for chars that may be inserted into the line buffer: ASCII space and
/// the visible ASCII range (letters, digits, punctuation, symbols).
///
/// Control bytes 0x00..=0x1F and DEL (0x7F) are never printable, nor is
/// anything outside ASCII (each input unit must occupy one terminal cell).
pub fn is_printable(ch: char) -> bool {
    matches!(ch, ' '..='~')
}

/// A chunk is insertable only if it is non-empty and every char is printable.
pub fn is_printable_chunk(chunk: &str) -> bool {
    !chunk.is_empty() && chunk.chars().all(is_printable)
}

// -------------------------------------------------------------------------------------------------
// Key sequence
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeySequence(SmallVec<[char; 4]>);

impl KeySequence {
    pub fn new(seq: &str) -> Self {
        Self(seq.chars().collect())
    }

    pub fn chars(&self) -> &[char] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, chunk: &str) -> bool {
        let mut it = chunk.chars();
        for c in &self.0 {
            if it.next() != Some(*c) {
                return false;
            }
        }
        it.next().is_none()
    }
}

impl From<&str> for KeySequence {
    fn from(s: &str) -> Self {
        KeySequence::new(s)
    }
}

impl From<NamedKey> for KeySequence {
    fn from(k: NamedKey) -> Self {
        KeySequence::new(k.sequence())
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.0 {
            write!(f, "{}", c.escape_debug())?;
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
// Resolution result
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The whole chunk equals a bound key sequence.
    Matched(T),
    /// Unbound chunk made only of printable chars; insert it.
    FallbackLiteral,
    /// Unbound, non-printable (unknown escape sequence, stray control byte).
    Discard,
}

impl<T: Clone> Resolution<&T> {
    pub fn cloned(self) -> Resolution<T> {
        match self {
            Resolution::Matched(t) => Resolution::Matched(t.clone()),
            Resolution::FallbackLiteral => Resolution::FallbackLiteral,
            Resolution::Discard => Resolution::Discard,
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Key table
// -------------------------------------------------------------------------------------------------

/// Mutable mapping from key sequence to a bound value.
///
/// Later bindings replace earlier ones for the same sequence. Callers resolve
/// against the live table for every chunk; nothing is cached.
#[derive(Debug, Clone)]
pub struct KeyTable<A> {
    entries: BTreeMap<KeySequence, A>,
}

impl<A> Default for KeyTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> KeyTable<A> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Bind `seq` to `value`, returning the previous binding if any.
    pub fn bind(&mut self, seq: impl Into<KeySequence>, value: A) -> Option<A> {
        let seq = seq.into();
        let prev = self.entries.insert(seq.clone(), value);
        if prev.is_some() {
            trace!(target: "console.keys", key = %seq, "binding_replaced");
        }
        prev
    }

    pub fn unbind(&mut self, seq: impl Into<KeySequence>) -> Option<A> {
        self.entries.remove(&seq.into())
    }

    pub fn get(&self, chunk: &str) -> Option<&A> {
        self.entries.get(&KeySequence::new(chunk))
    }

    pub fn contains(&self, chunk: &str) -> bool {
        self.get(chunk).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&KeySequence, &A)> {
        self.entries.iter()
    }

    /// Classify one input chunk against the table.
    pub fn resolve(&self, chunk: &str) -> Resolution<&A> {
        if let Some(value) = self.get(chunk) {
            trace!(
                target: "console.keys",
                key = NamedKey::from_sequence(chunk).map(NamedKey::as_str).unwrap_or("custom"),
                "matched"
            );
            Resolution::Matched(value)
        } else if is_printable_chunk(chunk) {
            trace!(target: "console.keys", len = chunk.len(), "literal");
            Resolution::FallbackLiteral
        } else {
            trace!(target: "console.keys", len = chunk.len(), "discard");
            Resolution::Discard
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> KeyTable<&'static str> {
        let mut t = KeyTable::new();
        for k in NamedKey::ALL {
            t.bind(k, k.as_str());
        }
        t
    }

    #[test]
    fn visible_ascii_is_printable() {
        for code in 32u8..127 {
            let ch = code as char;
            assert!(is_printable(ch), "{code} should be printable");
        }
    }

    #[test]
    fn control_bytes_are_not_printable() {
        for code in (0u8..32).chain(std::iter::once(127)) {
            assert!(!is_printable(code as char), "{code} should be rejected");
        }
    }

    #[test]
    fn non_ascii_is_not_printable() {
        assert!(!is_printable('é'));
        assert!(!is_printable_chunk("naïve"));
    }

    #[test]
    fn chunk_requires_every_char_printable() {
        assert!(is_printable_chunk("ls -la"));
        assert!(!is_printable_chunk("ls\n"));
        assert!(!is_printable_chunk(""));
    }

    #[test]
    fn arrow_keys_match_exactly() {
        let t = table();
        assert_eq!(t.resolve(keys::UP), Resolution::Matched(&"up"));
        assert_eq!(t.resolve(keys::LEFT), Resolution::Matched(&"left"));
    }

    #[test]
    fn unknown_escape_sequence_is_discarded() {
        let t = table();
        assert_eq!(t.resolve("\u{1b}[3~"), Resolution::Discard);
        assert_eq!(t.resolve("\u{1b}[A\u{1b}[A"), Resolution::Discard);
    }

    #[test]
    fn printable_chunk_falls_back_to_literal() {
        let t = table();
        assert_eq!(t.resolve("x"), Resolution::FallbackLiteral);
        assert_eq!(t.resolve(" "), Resolution::FallbackLiteral);
    }

    #[test]
    fn bound_printable_char_wins_over_literal() {
        let mut t = table();
        t.bind("{", "jump_left");
        assert_eq!(t.resolve("{"), Resolution::Matched(&"jump_left"));
    }

    #[test]
    fn rebinding_replaces_previous_value() {
        let mut t = table();
        let prev = t.bind(keys::ENTER, "wrapped_enter");
        assert_eq!(prev, Some("enter"));
        assert_eq!(t.resolve(keys::ENTER), Resolution::Matched(&"wrapped_enter"));
        assert_eq!(t.len(), NamedKey::ALL.len());
    }

    #[test]
    fn unbound_control_key_is_discarded_after_unbind() {
        let mut t = table();
        t.unbind(keys::TAB);
        assert_eq!(t.resolve(keys::TAB), Resolution::Discard);
    }

    #[test]
    fn named_key_round_trips_through_sequence() {
        for k in NamedKey::ALL {
            assert_eq!(NamedKey::from_sequence(k.sequence()), Some(k));
        }
        assert_eq!(NamedKey::from_sequence("q"), None);
    }

    #[test]
    fn key_sequence_display_escapes_control_chars() {
        assert_eq!(KeySequence::from(keys::UP).to_string(), "\\u{1b}[A");
        assert!(KeySequence::from(keys::UP).matches("\u{1b}[A"));
        assert!(!KeySequence::from(keys::UP).matches("\u{1b}["));
    }
}
