//! Library surface of the `lintel` command-line shell.
//!
//! Option parsing and the text reporter live here (rather than in the binary
//! alone) so fuzz targets and integration tests can exercise them directly.

/// Command-line option parsing.
pub mod options;
/// Plain-text diagnostic printer.
pub mod reporter;
