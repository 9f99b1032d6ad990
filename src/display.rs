//! Terminal Display
//!
//! Turns the HTML fragments produced by commands and scripts into ANSI
//! text for a terminal. Only the color spans and `<br>` the sandbox emits
//! are understood; other markup passes through untouched.

use regex_lite::{Captures, Regex};

use crate::output::{LineKind, OutputLine};

/// Clear the screen and home the cursor.
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

const RESET: &str = "\x1B[0m";
const DIM: &str = "\x1B[2m";

lazy_static::lazy_static! {
    static ref COLOR_SPAN: Option<Regex> =
        Regex::new(r#"(?s)<span style="color: ([^;"]+);">(.*?)</span>"#).ok();
    static ref LINE_BREAK: Option<Regex> = Regex::new(r"<br\s*/?>").ok();
}

fn ansi_color(css: &str) -> &'static str {
    match css.trim().to_ascii_lowercase().as_str() {
        "#33ff33" | "green" => "\x1B[32m",
        "yellow" => "\x1B[33m",
        "red" => "\x1B[31m",
        _ => "",
    }
}

/// Render an HTML fragment as ANSI text. A trailing line break is dropped.
pub fn to_ansi(html: &str) -> String {
    let colored = match COLOR_SPAN.as_ref() {
        Some(re) => re
            .replace_all(html, |caps: &Captures<'_>| {
                let color = ansi_color(&caps[1]);
                if color.is_empty() {
                    caps[2].to_string()
                } else {
                    format!("{}{}{}", color, &caps[2], RESET)
                }
            })
            .into_owned(),
        None => html.to_string(),
    };
    let text = match LINE_BREAK.as_ref() {
        Some(re) => re.replace_all(&colored, "\n").into_owned(),
        None => colored,
    };
    text.strip_suffix('\n').map(str::to_string).unwrap_or(text)
}

/// Render one display line for the terminal.
pub fn render_line(line: &OutputLine) -> String {
    match line.kind {
        LineKind::Prompt => format!("{}{}{}", DIM, line.render(), RESET),
        LineKind::Output => to_ansi(&line.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(to_ansi("hello_world.txt script.js"), "hello_world.txt script.js");
    }

    #[test]
    fn test_console_spans() {
        let html = "<span style=\"color: #33FF33;\">a</span> <span style=\"color: #33FF33;\">b</span><br>\
                    <span style=\"color: yellow;\">Warning: w</span><br>\
                    <span style=\"color: red;\">Error: e >:(</span><br>";
        assert_eq!(
            to_ansi(html),
            "\x1B[32ma\x1B[0m \x1B[32mb\x1B[0m\n\x1B[33mWarning: w\x1B[0m\n\x1B[31mError: e >:(\x1B[0m"
        );
    }

    #[test]
    fn test_unknown_color_keeps_text() {
        assert_eq!(to_ansi("<span style=\"color: blue;\">x</span>"), "x");
    }

    #[test]
    fn test_raw_output_breaks() {
        assert_eq!(to_ansi("one<br>two<br>"), "one\ntwo");
    }

    #[test]
    fn test_render_prompt_line() {
        let line = OutputLine { kind: LineKind::Prompt, text: "ls".to_string() };
        assert_eq!(render_line(&line), "\x1B[2m> ls\x1B[0m");
    }
}
