//! Console Buffer
//!
//! Collects script output as HTML fragments. Each console call produces
//! exactly one `<br>`-terminated line; arguments are not HTML-escaped.

const LOG_COLOR: &str = "#33FF33";

#[derive(Debug, Default)]
pub struct ConsoleBuffer {
    output: String,
}

impl ConsoleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `console.log`: one green span per argument, space-joined.
    pub fn log(&mut self, args: &[String]) {
        let spans: Vec<String> = args
            .iter()
            .map(|arg| format!("<span style=\"color: {};\">{}</span>", LOG_COLOR, arg))
            .collect();
        self.output.push_str(&spans.join(" "));
        self.output.push_str("<br>");
    }

    pub fn warn(&mut self, args: &[String]) {
        self.colored_line("yellow", "Warning", &args.join(" "));
    }

    pub fn error(&mut self, args: &[String]) {
        self.colored_line("red", "Error", &args.join(" "));
    }

    /// `output(text)`: unformatted.
    pub fn raw(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push_str("<br>");
    }

    /// A failure that aborted the script.
    pub fn execution_error(&mut self, message: &str) {
        self.colored_line("red", "Execution Error", message);
    }

    fn colored_line(&mut self, color: &str, label: &str, text: &str) {
        self.output
            .push_str(&format!("<span style=\"color: {};\">{}: {}</span><br>", color, label, text));
    }

    /// Captured output with surrounding whitespace trimmed.
    pub fn finish(self) -> String {
        self.output.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_log_wraps_each_argument() {
        let mut console = ConsoleBuffer::new();
        console.log(&strings(&["a", "1"]));
        assert_eq!(
            console.finish(),
            "<span style=\"color: #33FF33;\">a</span> <span style=\"color: #33FF33;\">1</span><br>"
        );
    }

    #[test]
    fn test_log_without_arguments_is_blank_line() {
        let mut console = ConsoleBuffer::new();
        console.log(&[]);
        assert_eq!(console.finish(), "<br>");
    }

    #[test]
    fn test_warn_error_and_failure_lines() {
        let mut console = ConsoleBuffer::new();
        console.warn(&strings(&["careful", "now"]));
        console.error(&strings(&["bad"]));
        console.execution_error("boom");
        assert_eq!(
            console.finish(),
            "<span style=\"color: yellow;\">Warning: careful now</span><br>\
             <span style=\"color: red;\">Error: bad</span><br>\
             <span style=\"color: red;\">Execution Error: boom</span><br>"
        );
    }

    #[test]
    fn test_raw_output_and_trim() {
        let mut console = ConsoleBuffer::new();
        console.raw("  plain ");
        assert_eq!(console.finish(), "plain <br>");
    }
}
