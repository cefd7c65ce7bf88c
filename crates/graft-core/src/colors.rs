//! ANSI color codes for trace output.
//!
//! - Blue: rule names
//! - Green: consumed tokens
//! - Red: error tokens and syntax errors
//! - Dim: decisions, actions, structure

/// ANSI color palette. Standard 16-color codes only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub red: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        red: "\x1b[31m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        blue: "",
        green: "",
        red: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }

    /// Wrap `text` in `color` and a reset, or return it unchanged when off.
    pub fn paint(&self, color: &'static str, text: &str) -> String {
        if self.is_enabled() {
            format!("{color}{text}{}", self.reset)
        } else {
            text.to_owned()
        }
    }
}
