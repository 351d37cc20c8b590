#![no_main]

use libfuzzer_sys::fuzz_target;
use lintel_core::diag::DiagCollector;
use lintel_core::parser::parse::Parser;
use lintel_core::parser::visit::{BufferingVisitor, VisitEvent};
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
    let mut parser = Parser::new(&source, &zone, &diags);
    let mut recorder = BufferingVisitor::new();
    parser.parse_and_visit_module(&mut recorder);

    // Scope events must balance and identifiers must point into the input.
    let mut depth: i64 = 0;
    let mut saw_end = false;
    for event in recorder.events() {
        match event {
            VisitEvent::EnterBlockScope
            | VisitEvent::EnterClassScope
            | VisitEvent::EnterForScope
            | VisitEvent::EnterFunctionScope => depth += 1,
            VisitEvent::EnterNamedFunctionScope(name) => {
                assert!(name.span.end as usize <= source.len());
                depth += 1;
            }
            VisitEvent::ExitBlockScope
            | VisitEvent::ExitClassScope
            | VisitEvent::ExitForScope
            | VisitEvent::ExitFunctionScope => {
                depth -= 1;
                assert!(depth >= 0, "scope exit without matching enter");
            }
            VisitEvent::PropertyDeclaration(name)
            | VisitEvent::VariableDeclaration(name, _)
            | VisitEvent::VariableAssignment(name)
            | VisitEvent::VariableTypeofUse(name)
            | VisitEvent::VariableUse(name) => {
                assert!(name.span.begin <= name.span.end);
                assert!(name.span.end as usize <= source.len());
            }
            VisitEvent::EndOfModule => saw_end = true,
        }
    }
    assert_eq!(depth, 0, "unbalanced scope events");
    assert!(saw_end, "missing end_of_module");
});
