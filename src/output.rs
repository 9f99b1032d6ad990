//! Output Buffer
//!
//! The session's display: an ordered list of rendered lines capped at
//! `max_lines`. Appended fragments are split into rendered lines (at each
//! `<br>` for HTML, at each newline otherwise) and the oldest whole lines
//! are dropped first. Every change is also queued as an `OutputEvent` for
//! front ends that draw incrementally.

use std::collections::VecDeque;

pub const DEFAULT_MAX_LINES: usize = 100;

const LINE_BREAK: &str = "<br>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Echo of a submitted sub-command.
    Prompt,
    /// Command or script output, possibly an HTML fragment.
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    pub fn render(&self) -> String {
        match self.kind {
            LineKind::Prompt => format!("> {}", self.text),
            LineKind::Output => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Line(OutputLine),
    Clear,
}

#[derive(Debug, Clone)]
pub struct OutputBuffer {
    lines: VecDeque<OutputLine>,
    max_lines: usize,
    events: VecDeque<OutputEvent>,
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl OutputBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            events: VecDeque::new(),
        }
    }

    pub fn push_prompt(&mut self, input: &str) {
        self.push(OutputLine { kind: LineKind::Prompt, text: input.to_string() });
    }

    /// Append output, one display line per rendered line. Empty text adds
    /// nothing.
    pub fn push_output(&mut self, text: &str) {
        for line in rendered_lines(text) {
            self.push(OutputLine { kind: LineKind::Output, text: line.to_string() });
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.events.clear();
        self.events.push_back(OutputEvent::Clear);
    }

    pub fn lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Retained lines, newline-joined.
    pub fn render(&self) -> String {
        self.lines.iter().map(OutputLine::render).collect::<Vec<_>>().join("\n")
    }

    /// Drain queued events. A consumer that lags by more than `max_lines`
    /// only sees the lines still on display.
    pub fn take_events(&mut self) -> Vec<OutputEvent> {
        self.events.drain(..).collect()
    }

    fn push(&mut self, line: OutputLine) {
        self.lines.push_back(line.clone());
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }

        self.events.push_back(OutputEvent::Line(line));
        let line_events = self.events.iter().filter(|e| matches!(e, OutputEvent::Line(_))).count();
        if line_events > self.max_lines {
            if let Some(pos) = self.events.iter().position(|e| matches!(e, OutputEvent::Line(_))) {
                self.events.remove(pos);
            }
        }
    }
}

/// Split a fragment into the lines it renders as. HTML breaks stay
/// attached to the line they end.
fn rendered_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else if text.contains(LINE_BREAK) {
        text.split_inclusive(LINE_BREAK).collect()
    } else {
        text.split('\n').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_output() {
        let mut buffer = OutputBuffer::default();
        buffer.push_prompt("pwd");
        buffer.push_output("/");
        buffer.push_output("");
        assert_eq!(buffer.render(), "> pwd\n/");
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_retention_drops_oldest_lines() {
        let mut buffer = OutputBuffer::new(3);
        for i in 0..5 {
            buffer.push_output(&i.to_string());
        }
        assert_eq!(buffer.render(), "2\n3\n4");
    }

    #[test]
    fn test_multiline_output_counts_each_line() {
        let mut buffer = OutputBuffer::new(2);
        buffer.push_output("a\nb\nc");
        assert_eq!(buffer.len(), 2);
        buffer.push_output("d");
        assert_eq!(buffer.render(), "c\nd");
    }

    #[test]
    fn test_html_output_splits_at_breaks() {
        let mut buffer = OutputBuffer::new(3);
        buffer.push_output("<span>1</span><br><span>2</span><br>3<br>4<br>");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.render(), "<span>2</span><br>\n3<br>\n4<br>");
    }

    #[test]
    fn test_blank_lines_inside_text_are_kept() {
        let mut buffer = OutputBuffer::default();
        buffer.push_output("NAME\n\nSYNOPSIS");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.render(), "NAME\n\nSYNOPSIS");
    }

    #[test]
    fn test_default_cap_is_100() {
        let mut buffer = OutputBuffer::default();
        for i in 0..150 {
            buffer.push_output(&format!("line {}", i));
        }
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.lines().next().map(|l| l.text.as_str()), Some("line 50"));
    }

    #[test]
    fn test_clear_and_events() {
        let mut buffer = OutputBuffer::default();
        buffer.push_prompt("ls");
        buffer.push_output("a b");
        assert_eq!(buffer.take_events().len(), 2);
        assert!(buffer.take_events().is_empty());

        buffer.push_output("stale");
        buffer.clear();
        buffer.push_output("fresh");
        assert!(!buffer.is_empty());
        assert_eq!(
            buffer.take_events(),
            vec![
                OutputEvent::Clear,
                OutputEvent::Line(OutputLine { kind: LineKind::Output, text: "fresh".to_string() }),
            ]
        );
    }

    #[test]
    fn test_events_are_bounded() {
        let mut buffer = OutputBuffer::new(2);
        for i in 0..10 {
            buffer.push_output(&i.to_string());
        }
        let texts: Vec<String> = buffer
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                OutputEvent::Line(line) => Some(line.text),
                OutputEvent::Clear => None,
            })
            .collect();
        assert_eq!(texts, vec!["8", "9"]);
    }
}
