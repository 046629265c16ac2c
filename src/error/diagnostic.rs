//! Diagnostic formatting for better error messages
//!
//! Renders a `RubbyError` with source code context for the command line.

use super::{RubbyError, SourceLocation};
use colored::Colorize;

/// Diagnostic information for displaying errors with context
pub struct Diagnostic {
    error: RubbyError,
    source: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic from an error
    pub fn new(error: RubbyError) -> Self {
        Self {
            error,
            source: None,
        }
    }

    /// Create a diagnostic with source code context
    pub fn with_source(error: RubbyError, source: &str) -> Self {
        Self {
            error,
            source: Some(source.to_string()),
        }
    }

    /// Format the diagnostic with color and context
    pub fn format(&self) -> String {
        let mut output = String::new();

        // Error header
        let kind = self.error.kind().red().bold();
        output.push_str(&format!("{}: ", kind));
        output.push_str(self.error.message());
        output.push('\n');

        if let Some(location) = self.error.location() {
            output.push_str(&format!("  {} {}\n", "-->".blue().bold(), location));

            if let Some(ref source) = self.source {
                output.push_str(&self.format_source_context(source, location));
            }
        }

        let expected = self.error.expected();
        if !expected.is_empty() {
            output.push_str(&format!(
                "  {} expected one of: {}\n",
                "=".blue().bold(),
                expected.join(", ")
            ));
        }

        output
    }

    /// Source lines around the error with the offending token underlined
    fn format_source_context(&self, source: &str, location: &SourceLocation) -> String {
        let lines: Vec<&str> = source.lines().collect();
        if location.line == 0 || location.line > lines.len() {
            return String::new();
        }

        let first = location.line.saturating_sub(1).max(1);
        let last = (location.line + 1).min(lines.len());
        let gutter = last.to_string().len();

        let mut output = String::new();
        for number in first..=last {
            let text = lines[number - 1];
            let label = format!("{:>width$}", number, width = gutter);

            if number != location.line {
                output.push_str(&format!("  {} {}\n", label.blue(), text));
                continue;
            }

            output.push_str(&format!("  {} {}\n", label.blue().bold(), text));
            let column = location.column.max(1);
            let room = text.chars().count().saturating_sub(column - 1).max(1);
            let marker = "^".repeat(self.underline_width().min(room));
            output.push_str(&format!(
                "  {} {}{}\n",
                " ".repeat(gutter),
                " ".repeat(column - 1),
                marker.red().bold()
            ));
        }

        output
    }

    /// Width of the offending token, taken from a parse error's `found` text
    fn underline_width(&self) -> usize {
        match &self.error {
            RubbyError::ParseError { found, .. } => {
                let lexeme = found
                    .strip_prefix('\'')
                    .and_then(|f| f.strip_suffix('\''))
                    .unwrap_or("");
                lexeme.chars().count().max(1)
            }
            _ => 1,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
