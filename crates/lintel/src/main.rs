//! `lintel` — command-line shell for the Lintel JavaScript linter.
//!
//! Reads each file named on the command line, runs the frontend pipeline
//! (lexer → parser → scope analyzer), and prints every diagnostic. Exits 0
//! when no diagnostics were reported and 1 otherwise.

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Context;

use lintel_core::diag::{Diag, DiagReporter};
use lintel_core::parser::parse::Parser;
use lintel_core::parser::scope::Linter;
use lintel_core::source::PaddedString;
use lintel_core::zone::Zone;

use lintel::options::{parse_options, ColorMode, Options};
use lintel::reporter::TextReporter;

const USAGE: &str = "usage: lintel [--color | --no-color] file...";

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let arguments: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_options(&arguments);

    if options.help {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    }

    let color = match options.color {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    };

    let mut any_diagnostics = report_unrecognized_options(&options, color);

    if options.files.is_empty() {
        eprintln!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    }

    for file_path in &options.files {
        let text = std::fs::read_to_string(file_path)
            .with_context(|| format!("failed to read {file_path}"))?;
        if lint_file(file_path, &text, color) > 0 {
            any_diagnostics = true;
        }
    }

    Ok(if any_diagnostics {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Route unknown flags through the diagnostic pipeline. Returns `true` when
/// any were reported.
fn report_unrecognized_options(options: &Options, color: bool) -> bool {
    if options.unrecognized.is_empty() {
        return false;
    }
    let empty = PaddedString::new("");
    let reporter = TextReporter::new(std::io::stderr(), "lintel", &empty, color);
    for option in &options.unrecognized {
        reporter.report(Diag::UnrecognizedOption {
            option: option.clone(),
        });
    }
    true
}

/// Lint one file; returns the number of diagnostics reported.
fn lint_file(file_path: &str, text: &str, color: bool) -> usize {
    tracing::debug!(file_path, bytes = text.len(), "linting file");
    let source = PaddedString::new(text);
    let zone = Zone::new();
    let reporter = TextReporter::new(std::io::stdout(), file_path, &source, color);
    let mut parser = Parser::new(&source, &zone, &reporter);
    let mut linter = Linter::new(&reporter);
    parser.parse_and_visit_module(&mut linter);
    reporter.reported_count()
}
