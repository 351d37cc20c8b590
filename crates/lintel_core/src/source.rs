//! Source buffers, spans, and line/column lookup.
//!
//! The lexer works on a [`PaddedString`]: an owned UTF-8 buffer followed by at
//! least one NUL byte, so scanning code may read one byte past the last
//! content byte without a bounds check. Diagnostics and AST nodes reference
//! the buffer through [`Span`]s (half-open byte-offset ranges); a [`Locator`]
//! turns spans into 1-based line/column pairs for human-facing reporters.

// ─────────────────────────────────────────────────────────────────────────────
// PaddedString
// ─────────────────────────────────────────────────────────────────────────────

/// Number of NUL bytes appended past the content.
const PADDING_LEN: usize = 4;

/// An owned UTF-8 source buffer with trailing NUL padding.
///
/// The content bytes are followed by [`PADDING_LEN`] zero bytes. Because a
/// NUL byte can never appear inside a well-formed token, the lexer uses the
/// padding as a sentinel and only compares against the content length when it
/// actually sees a zero byte.
pub struct PaddedString {
    bytes: Vec<u8>,
    content_len: usize,
}

impl PaddedString {
    /// Create a padded copy of `source`.
    pub fn new(source: &str) -> Self {
        let content_len = source.len();
        let mut bytes = Vec::with_capacity(content_len + PADDING_LEN);
        bytes.extend_from_slice(source.as_bytes());
        bytes.resize(content_len + PADDING_LEN, 0);
        Self { bytes, content_len }
    }

    /// Length of the content in bytes, excluding padding.
    pub fn len(&self) -> usize {
        self.content_len
    }

    /// Returns `true` when the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content_len == 0
    }

    /// The content as a string slice (padding excluded).
    pub fn as_str(&self) -> &str {
        // Content bytes came from a &str and are never mutated.
        debug_assert!(std::str::from_utf8(&self.bytes[..self.content_len]).is_ok());
        unsafe { std::str::from_utf8_unchecked(&self.bytes[..self.content_len]) }
    }

    /// The content plus trailing NUL padding.
    pub fn padded_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The byte at `offset`, or a padding NUL when `offset` is at or past the
    /// end of the content (up to the padding length).
    #[inline]
    pub fn byte_at(&self, offset: usize) -> u8 {
        self.bytes[offset]
    }

    /// The text covered by `span`.
    pub fn slice(&self, span: Span) -> &str {
        &self.as_str()[span.begin as usize..span.end as usize]
    }
}

impl From<&str> for PaddedString {
    fn from(source: &str) -> Self {
        PaddedString::new(source)
    }
}

impl std::fmt::Debug for PaddedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaddedString({:?})", self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Span
// ─────────────────────────────────────────────────────────────────────────────

/// A half-open `[begin, end)` byte-offset range in a [`PaddedString`].
///
/// Spans are only comparable within a single input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start offset.
    pub begin: u32,
    /// Exclusive end offset.
    pub end: u32,
}

impl Span {
    /// Create a span; `begin` must not exceed `end`.
    pub fn new(begin: u32, end: u32) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    /// An empty span at `offset`.
    pub fn empty_at(offset: u32) -> Self {
        Self {
            begin: offset,
            end: offset,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.begin
    }

    /// Returns `true` for zero-length spans.
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Locator
// ─────────────────────────────────────────────────────────────────────────────

/// A 1-based line/column position, measured in bytes within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Byte offset from the beginning of the input.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

/// Maps byte offsets back to line/column positions.
///
/// Reporters are the only consumers, so the lookup scans the buffer on demand
/// instead of keeping a line table hot during lexing.
pub struct Locator<'a> {
    source: &'a PaddedString,
}

impl<'a> Locator<'a> {
    /// Create a locator for `source`.
    pub fn new(source: &'a PaddedString) -> Self {
        Self { source }
    }

    /// The position of `offset` (clamped to the content length).
    pub fn position(&self, offset: u32) -> SourcePosition {
        let offset = (offset as usize).min(self.source.len());
        let mut line: u32 = 1;
        let mut line_begin: usize = 0;
        let text = self.source.as_str();
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < offset {
            match bytes[i] {
                b'\n' => {
                    line += 1;
                    line_begin = i + 1;
                    i += 1;
                }
                b'\r' => {
                    // CRLF counts as one terminator.
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' && i + 1 < offset {
                        i += 2;
                    } else {
                        i += 1;
                    }
                    line += 1;
                    line_begin = i;
                }
                0xE2 => {
                    // U+2028 / U+2029 are E2 80 A8 / E2 80 A9.
                    if bytes.len() - i >= 3
                        && bytes[i + 1] == 0x80
                        && (bytes[i + 2] == 0xA8 || bytes[i + 2] == 0xA9)
                    {
                        line += 1;
                        line_begin = i + 3;
                        i += 3;
                    } else {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        SourcePosition {
            offset: offset as u32,
            line,
            column: (offset - line_begin) as u32 + 1,
        }
    }

    /// The begin position of `span`.
    pub fn begin_position(&self, span: Span) -> SourcePosition {
        self.position(span.begin)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
