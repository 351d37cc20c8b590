//! `lintel_core` — the frontend library for the Lintel JavaScript linter.
//!
//! Lintel is a single-pass static analyzer: it lexes and parses a JavaScript
//! source file once, resolves every variable reference against the lexical
//! scope structure, and reports a fixed catalogue of findings (unresolved
//! references, assignments to `const`, redeclarations, malformed literals,
//! missing operators, …) with precise source spans. It never evaluates or
//! transforms code.
//!
//! # Crate layout
//!
//! - [`source`] — padded source buffers, spans, and line/column lookup.
//! - [`zone`] — bump-pointer region allocator for decoded identifier names.
//! - [`diag`] — the diagnostic catalogue and the reporting capability.
//! - [`language`] — variable kinds and function attributes.
//! - [`parser`] — lexer, expression/statement parser, visitors, and the
//!   scope analyzer.
//!
//! # Example
//!
//! ```
//! use lintel_core::diag::DiagCollector;
//! use lintel_core::parser::parse::Parser;
//! use lintel_core::parser::scope::Linter;
//! use lintel_core::source::PaddedString;
//! use lintel_core::zone::Zone;
//!
//! let source = PaddedString::new("const x = 1; x = 2;");
//! let zone = Zone::new();
//! let diags = DiagCollector::new();
//! let mut parser = Parser::new(&source, &zone, &diags);
//! let mut linter = Linter::new(&diags);
//! parser.parse_and_visit_module(&mut linter);
//! assert_eq!(diags.len(), 1); // assignment to const variable
//! ```

/// Diagnostic catalogue, reporting capability, and fatal-error hook.
pub mod diag;
/// Language-level enums shared by the parser and the scope analyzer.
pub mod language;
/// JavaScript frontend: lexer, parser, visitors, scope analyzer.
pub mod parser;
/// Source buffers, spans, and line/column lookup.
pub mod source;
/// Bump-pointer region allocator for frontend temporaries.
pub mod zone;
