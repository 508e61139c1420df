use tracing::trace;

/// Navigation pointer into [`History`].
///
/// `BeforeOldest` and `PastNewest` are the two boundaries reached by stepping
/// off either end. `PastNewest` is also the resting value after a submission
/// ("not browsing").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCursor {
    BeforeOldest,
    At(usize),
    PastNewest,
}

impl HistoryCursor {
    /// Signed index view: `-1` before the oldest entry, `len` past the newest.
    pub fn index(self, len: usize) -> isize {
        match self {
            HistoryCursor::BeforeOldest => -1,
            HistoryCursor::At(i) => i as isize,
            HistoryCursor::PastNewest => len as isize,
        }
    }
}

/// Append-only record of submitted lines, oldest first.
///
/// Entries are never truncated or deduplicated; empty lines are recorded too.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: HistoryCursor,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: HistoryCursor::PastNewest,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.cursor
    }

    /// Record a submitted line and stop browsing.
    pub fn push(&mut self, line: String) {
        self.entries.push(line);
        self.cursor = HistoryCursor::PastNewest;
        trace!(target: "console.history", len = self.entries.len(), "push");
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = HistoryCursor::PastNewest;
    }

    /// Step toward the oldest entry. Returns the entry now selected, or `None`
    /// when the oldest boundary was crossed (cursor parks at `BeforeOldest`).
    pub fn step_back(&mut self) -> Option<&str> {
        let next = match self.cursor {
            HistoryCursor::PastNewest if !self.entries.is_empty() => {
                HistoryCursor::At(self.entries.len() - 1)
            }
            HistoryCursor::At(i) if i > 0 => HistoryCursor::At(i - 1),
            _ => HistoryCursor::BeforeOldest,
        };
        self.cursor = next;
        trace!(target: "console.history", cursor = next.index(self.entries.len()), "step_back");
        self.selected()
    }

    /// Step toward the newest entry. Returns the entry now selected, or `None`
    /// when the newest boundary was crossed (cursor parks at `PastNewest`).
    pub fn step_forward(&mut self) -> Option<&str> {
        let next = match self.cursor {
            HistoryCursor::BeforeOldest if !self.entries.is_empty() => HistoryCursor::At(0),
            HistoryCursor::At(i) if i + 1 < self.entries.len() => HistoryCursor::At(i + 1),
            _ => HistoryCursor::PastNewest,
        };
        self.cursor = next;
        trace!(target: "console.history", cursor = next.index(self.entries.len()), "step_forward");
        self.selected()
    }

    fn selected(&self) -> Option<&str> {
        match self.cursor {
            HistoryCursor::At(i) => self.entries.get(i).map(String::as_str),
            _ => None,
        }
    }
}
