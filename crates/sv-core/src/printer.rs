//! Common emitter configuration and text utilities

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentationConfig {
    /// Type of indentation to use
    pub style: IndentationStyle,
    /// Number of spaces or tabs per indentation level
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentationStyle {
    /// Use spaces for indentation
    Spaces,
    /// Use tabs for indentation
    Tabs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnding {
    /// Unix-style line endings (\n)
    Unix,
    /// Windows-style line endings (\r\n)
    Windows,
}

/// Formatting knobs honored by the source emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Indentation configuration
    pub indentation: IndentationConfig,
    /// Whether the rendered artifact ends with a newline
    pub trailing_newline: bool,
    /// Line ending style
    pub line_ending: LineEnding,
}

impl Default for IndentationConfig {
    fn default() -> Self {
        Self {
            style: IndentationStyle::Spaces,
            size: 2,
        }
    }
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indentation: IndentationConfig::default(),
            trailing_newline: true,
            line_ending: LineEnding::Unix,
        }
    }
}

impl IndentationConfig {
    /// Create a new indentation config with spaces
    pub fn spaces(size: usize) -> Self {
        Self {
            style: IndentationStyle::Spaces,
            size,
        }
    }

    /// Create a new indentation config with tabs
    pub fn tabs(size: usize) -> Self {
        Self {
            style: IndentationStyle::Tabs,
            size,
        }
    }

    /// Generate an indentation string for the given level
    pub fn indent_string(&self, level: usize) -> String {
        let unit = match self.style {
            IndentationStyle::Spaces => " ".repeat(self.size),
            IndentationStyle::Tabs => "\t".repeat(self.size),
        };
        unit.repeat(level)
    }
}

impl LineEnding {
    /// Get the string representation of the line ending
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
        }
    }
}

impl EmitConfig {
    /// Two-space indentation, the house style of the emitted scripts
    pub fn compact() -> Self {
        Self::default()
    }

    /// Four-space indentation
    pub fn wide() -> Self {
        Self {
            indentation: IndentationConfig::spaces(4),
            ..Self::default()
        }
    }
}

pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_indentation_is_two_spaces() {
        let config = IndentationConfig::default();
        assert_eq!(config.indent_string(0), "");
        assert_eq!(config.indent_string(1), "  ");
        assert_eq!(config.indent_string(3), "      ");
    }

    #[test]
    fn tab_indentation() {
        let config = IndentationConfig::tabs(1);
        assert_eq!(config.indent_string(2), "\t\t");
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_string(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_string("a\\b"), "a\\\\b");
        assert_eq!(escape_string("line\nbreak"), "line\\nbreak");
    }
}
