//! Command History
//!
//! Submitted lines plus a navigation cursor. The cursor sits one past the
//! newest entry after each `record`.

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line. Blank lines are ignored.
    pub fn record(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            self.entries.push(line.to_string());
        }
        self.cursor = self.entries.len();
    }

    /// Step back (ArrowUp). `None` once the oldest entry is reached.
    pub fn previous(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step forward (ArrowDown). Moving past the newest entry yields `""`;
    /// `None` if already there.
    pub fn next(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries.get(self.cursor).map(String::as_str).unwrap_or(""))
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
}
