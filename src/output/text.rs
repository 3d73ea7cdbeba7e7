use std::io::{self, IsTerminal};

use crate::config::Theme;
use crate::error::AppResult;

const PREVIEW_LIMIT: usize = 120;

pub fn print_line(line: &str) -> AppResult<()> {
    println!("{line}");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
    theme: Theme,
}

impl Palette {
    pub fn for_stdout(theme: Theme) -> Self {
        Self {
            enabled: io::stdout().is_terminal(),
            theme,
        }
    }

    pub fn plain() -> Self {
        Self {
            enabled: false,
            theme: Theme::Auto,
        }
    }

    pub fn highlight(&self, text: &str) -> String {
        // bright yellow reads badly on light backgrounds
        let code = match self.theme {
            Theme::Light => "1;31",
            Theme::Dark | Theme::Auto => "1;33",
        };
        self.paint(code, text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

pub fn preview(snippet: &str) -> String {
    let decoded = html_escape::decode_html_entities(snippet);
    let compact = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if compact.is_empty() {
        return "(no preview)".to_string();
    }
    if compact.len() <= PREVIEW_LIMIT {
        return compact;
    }

    let mut end = PREVIEW_LIMIT;
    while !compact.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &compact[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_snippets() {
        let long = "word ".repeat(60);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert!(shown.len() <= PREVIEW_LIMIT + 3);
    }

    #[test]
    fn preview_decodes_entities_and_compacts() {
        assert_eq!(preview("Q3 &amp; Q4\n\n  numbers"), "Q3 & Q4 numbers");
        assert_eq!(preview("   "), "(no preview)");
    }

    #[test]
    fn plain_palette_leaves_text_alone() {
        assert_eq!(Palette::plain().highlight("*"), "*");
    }
}
