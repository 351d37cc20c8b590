//! Plain-text diagnostic printer.
//!
//! Prints one `file:line:col: error: message` line per diagnostic, plus a
//! `note:` line for diagnostics that reference a second source location
//! (original declarations and the like), optionally with ANSI color.

use std::cell::{Cell, RefCell};
use std::io::Write;

use lintel_core::diag::{Diag, DiagReporter};
use lintel_core::source::{Locator, PaddedString, Span};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

/// A [`DiagReporter`] that writes human-readable lines to `output`.
pub struct TextReporter<'a, W: Write> {
    output: RefCell<W>,
    file_path: &'a str,
    locator: Locator<'a>,
    color: bool,
    reported_count: Cell<usize>,
}

impl<'a, W: Write> TextReporter<'a, W> {
    /// Create a reporter for diagnostics of `source` (read from
    /// `file_path`).
    pub fn new(output: W, file_path: &'a str, source: &'a PaddedString, color: bool) -> Self {
        Self {
            output: RefCell::new(output),
            file_path,
            locator: Locator::new(source),
            color,
            reported_count: Cell::new(0),
        }
    }

    /// Number of diagnostics printed so far.
    pub fn reported_count(&self) -> usize {
        self.reported_count.get()
    }

    fn write_line(&self, span: Option<Span>, severity: &str, message: &str) {
        let mut output = self.output.borrow_mut();
        if let Some(span) = span {
            let position = self.locator.begin_position(span);
            let _ = write!(
                output,
                "{}:{}:{}: ",
                self.file_path, position.line, position.column
            );
        } else {
            let _ = write!(output, "{}: ", self.file_path);
        }
        if self.color {
            let color = if severity == "error" { ANSI_RED } else { ANSI_CYAN };
            let _ = writeln!(output, "{color}{severity}{ANSI_RESET}: {message}");
        } else {
            let _ = writeln!(output, "{severity}: {message}");
        }
    }
}

impl<'a, W: Write> DiagReporter for TextReporter<'a, W> {
    fn report(&self, diag: Diag) {
        self.reported_count.set(self.reported_count.get() + 1);
        self.write_line(diag.primary_span(), "error", &diag.to_string());
        if let Some((note_span, note_message)) = diag.note() {
            self.write_line(Some(note_span), "note", note_message);
        }
    }
}
