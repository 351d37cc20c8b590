#![no_main]

use libfuzzer_sys::fuzz_target;
use lintel_core::diag::DiagCollector;
use lintel_core::parser::scanner::{Lexer, TokenKind};
use lintel_core::source::PaddedString;
use lintel_core::zone::Zone;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Characters the lexer has not been taught hit the fatal abort hook;
    // keep the fuzzer on the supported alphabet.
    fn supported(c: char) -> bool {
        c.is_ascii()
            || c.is_alphanumeric()
            || matches!(
                c,
                '\u{A0}'
                    | '\u{1680}'
                    | '\u{2000}'..='\u{200A}'
                    | '\u{2028}'
                    | '\u{2029}'
                    | '\u{202F}'
                    | '\u{205F}'
                    | '\u{3000}'
                    | '\u{FEFF}'
            )
    }
    if !text.chars().all(supported) {
        return;
    }

    let source = PaddedString::new(text);
    let zone = Zone::new();
    let diags = DiagCollector::new();
    let mut lexer = Lexer::new(&source, &zone, &diags);

    // Tokens must be ordered, non-overlapping, and contained in the input.
    let mut previous_end: u32 = 0;
    loop {
        let token = *lexer.peek();
        assert!(token.begin <= token.end, "token with begin > end");
        assert!(
            token.begin >= previous_end,
            "token overlaps its predecessor"
        );
        assert!(
            token.end as usize <= source.len(),
            "token escapes the input"
        );
        if token.kind == TokenKind::EndOfFile {
            break;
        }
        previous_end = token.end;
        lexer.skip();
    }

    // Diagnostic spans must be contained in the input.
    for diag in diags.diags() {
        if let Some(span) = diag.primary_span() {
            assert!(span.begin <= span.end);
            assert!(span.end as usize <= source.len());
        }
    }
});
