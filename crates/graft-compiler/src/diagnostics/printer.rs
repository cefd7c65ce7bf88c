//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use graft_core::Colors;

use super::Diagnostics;
use super::message::Severity;

/// Builder for rendering diagnostics with various options.
pub struct DiagnosticsPrinter<'d> {
    diagnostics: &'d Diagnostics,
    colored: bool,
    warnings: bool,
}

impl<'d> DiagnosticsPrinter<'d> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            colored: false,
            warnings: true,
        }
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    /// Include warnings in the output (on by default).
    pub fn warnings(mut self, value: bool) -> Self {
        self.warnings = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let colors = Colors::new(self.colored);
        let mut first = true;
        for diag in self.diagnostics.iter() {
            if diag.is_warning() && !self.warnings {
                continue;
            }
            if !first {
                w.write_char('\n')?;
            }
            first = false;

            let severity = match diag.severity() {
                Severity::Error => colors.paint(colors.red, "error"),
                Severity::Warning => "warning".to_string(),
            };
            writeln!(w, "{severity}: {}", diag.message)?;
            writeln!(w, "  --> {}", colors.paint(colors.blue, &diag.location.to_string()))?;
            for (location, note) in &diag.related {
                writeln!(w, "  {} {note} ({location})", colors.paint(colors.dim, "= note:"))?;
            }
            for hint in &diag.hints {
                writeln!(w, "help: {hint}")?;
            }
        }
        Ok(())
    }
}
