//! Command-line option parsing.
//!
//! Hand-rolled instead of a derive-based parser: unknown flags must flow into
//! the diagnostic pipeline as [`lintel_core::diag::Diag::UnrecognizedOption`]
//! findings rather than terminating the process, so the linter keeps checking
//! whatever files it was given.

/// Whether diagnostic output uses ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when standard output is a terminal.
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

/// Parsed command-line options.
#[derive(Debug)]
pub struct Options {
    /// Input file paths, in order.
    pub files: Vec<String>,
    /// ANSI color behavior.
    pub color: ColorMode,
    /// `true` when `--help` was given.
    pub help: bool,
    /// Flags the parser did not recognize, in order.
    pub unrecognized: Vec<String>,
}

/// Parse `arguments` (excluding the program name).
///
/// Never fails: unknown flags are collected into
/// [`Options::unrecognized`] and everything else is interpreted
/// best-effort.
pub fn parse_options<S: AsRef<str>>(arguments: &[S]) -> Options {
    let mut options = Options {
        files: Vec::new(),
        color: ColorMode::Auto,
        help: false,
        unrecognized: Vec::new(),
    };
    let mut only_files_follow = false;
    for argument in arguments {
        let argument = argument.as_ref();
        if only_files_follow || !argument.starts_with('-') || argument == "-" {
            options.files.push(argument.to_owned());
            continue;
        }
        match argument {
            "--" => only_files_follow = true,
            "--color" => options.color = ColorMode::Always,
            "--no-color" => options.color = ColorMode::Never,
            "--help" | "-h" => options.help = true,
            _ => options.unrecognized.push(argument.to_owned()),
        }
    }
    options
}
