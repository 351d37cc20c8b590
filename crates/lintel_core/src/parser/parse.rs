//! Expression and statement parser.
//!
//! [`Parser::parse_expression`] builds an arena expression tree;
//! [`Parser::parse_and_visit_module`] drives a whole program, emitting visit
//! events describing scopes, declarations, and variable uses into a
//! [`Visitor`].
//!
//! The expression grammar is a precedence ladder. Chains at one precedence
//! level are collected into a single flat n-ary [`Expr::Binary`] node
//! (`x+y-z` has three children), parenthesized groups are reinterpreted as
//! arrow parameter lists when `=>` follows, and `async` is contextual.
//!
//! The parser never aborts on malformed input: each problem is reported once
//! through the diagnostic sink and an [`Expr::Invalid`] placeholder keeps the
//! tree and the event stream well formed.

use smallvec::smallvec;

use crate::diag::{Diag, DiagReporter};
use crate::language::{FunctionAttributes, VarKind};
use crate::parser::ast::{Expr, ExprArena, ExprId, ExprList, ObjectEntry};
use crate::parser::scanner::{Ident, Lexer, Token, TokenKind};
use crate::parser::visit::{BufferingVisitor, Visitor};
use crate::source::{PaddedString, Span};
use crate::zone::Zone;

/// Binary operator kinds, loosest level first. `**` (right-associative),
/// assignment, `?:`, and `,` are handled outside this table.
const BINARY_LEVELS: &[&[TokenKind]] = &[
    &[TokenKind::PipePipe, TokenKind::QuestionQuestion],
    &[TokenKind::AmpersandAmpersand],
    &[TokenKind::Pipe],
    &[TokenKind::Caret],
    &[TokenKind::Ampersand],
    &[
        TokenKind::EqualEqual,
        TokenKind::EqualEqualEqual,
        TokenKind::BangEqual,
        TokenKind::BangEqualEqual,
    ],
    &[
        TokenKind::Less,
        TokenKind::Greater,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
        TokenKind::In,
        TokenKind::Instanceof,
    ],
    &[
        TokenKind::LessLess,
        TokenKind::GreaterGreater,
        TokenKind::GreaterGreaterGreater,
    ],
    &[TokenKind::Plus, TokenKind::Minus],
    &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
];

fn compound_assignment_kind(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        PlusEqual
            | MinusEqual
            | StarEqual
            | StarStarEqual
            | SlashEqual
            | PercentEqual
            | LessLessEqual
            | GreaterGreaterEqual
            | GreaterGreaterGreaterEqual
            | AmpersandEqual
            | PipeEqual
            | CaretEqual
    )
}

/// The JavaScript frontend: owns one lexer and one expression arena, borrows
/// the diagnostic sink.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    arena: ExprArena<'a>,
    reporter: &'a dyn DiagReporter,
    /// `false` while parsing a C-style `for` head, where `in` terminates the
    /// init expression instead of acting as a relational operator.
    in_is_operator: bool,
}

impl<'a> Parser<'a> {
    /// Create a parser over `source`. Decoded identifier names are interned
    /// in `zone`; diagnostics go to `reporter`.
    pub fn new(source: &'a PaddedString, zone: &'a Zone, reporter: &'a dyn DiagReporter) -> Self {
        Self {
            lexer: Lexer::new(source, zone, reporter),
            arena: ExprArena::new(),
            reporter,
            in_is_operator: true,
        }
    }

    /// The underlying lexer, exposed so tests can observe token state (e.g.
    /// inserted semicolons).
    pub fn lexer(&mut self) -> &mut Lexer<'a> {
        &mut self.lexer
    }

    /// The expression arena.
    pub fn arena(&self) -> &ExprArena<'a> {
        &self.arena
    }

    // ────────────────────────────────────────────────────────────────────────
    // Module / statements
    // ────────────────────────────────────────────────────────────────────────

    /// Parse a whole program, emitting visit events into `visitor`.
    pub fn parse_and_visit_module(&mut self, visitor: &mut dyn Visitor<'a>) {
        tracing::debug!("parsing module");
        while self.peek().kind != TokenKind::EndOfFile {
            self.parse_and_visit_statement(visitor);
        }
        visitor.visit_end_of_module();
    }

    fn parse_and_visit_statement(&mut self, v: &mut dyn Visitor<'a>) {
        let token = *self.peek();
        match token.kind {
            TokenKind::Semicolon => self.skip(),
            TokenKind::LeftBrace => {
                self.skip();
                v.visit_enter_block_scope();
                self.parse_statements_until_right_brace(v);
                if self.peek().kind == TokenKind::RightBrace {
                    self.skip();
                }
                v.visit_exit_block_scope();
            }
            TokenKind::Var => {
                self.skip();
                self.parse_and_visit_declarators(VarKind::Var, token.span(), v);
                self.consume_semicolon();
            }
            TokenKind::Const => {
                self.skip();
                self.parse_and_visit_declarators(VarKind::Const, token.span(), v);
                self.consume_semicolon();
            }
            TokenKind::Let => {
                self.skip();
                self.parse_and_visit_declarators(VarKind::Let, token.span(), v);
                self.consume_semicolon();
            }
            TokenKind::Function => {
                self.parse_and_visit_function_declaration(FunctionAttributes::Normal, v);
            }
            TokenKind::Async => {
                self.skip();
                if self.peek().kind == TokenKind::Function {
                    self.parse_and_visit_function_declaration(FunctionAttributes::Async, v);
                } else {
                    self.lexer.rewind_to(token.begin);
                    self.parse_and_visit_expression_statement(v);
                }
            }
            TokenKind::Class => self.parse_and_visit_class(v),
            TokenKind::If => {
                self.skip();
                self.parse_and_visit_parenthesized_condition(v);
                self.parse_and_visit_statement(v);
                if self.peek().kind == TokenKind::Else {
                    self.skip();
                    self.parse_and_visit_statement(v);
                }
            }
            TokenKind::While => {
                self.skip();
                self.parse_and_visit_parenthesized_condition(v);
                self.parse_and_visit_statement(v);
            }
            TokenKind::Do => {
                self.skip();
                self.parse_and_visit_statement(v);
                if self.peek().kind == TokenKind::While {
                    self.skip();
                    self.parse_and_visit_parenthesized_condition(v);
                    self.consume_semicolon();
                }
            }
            TokenKind::For => self.parse_and_visit_for(v),
            TokenKind::Return | TokenKind::Throw => {
                self.skip();
                let next = self.peek();
                let has_operand = !matches!(
                    next.kind,
                    TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::EndOfFile
                ) && !next.has_leading_newline;
                if has_operand {
                    let operand = self.parse_expression_internal();
                    self.visit_expression(operand, v);
                }
                self.consume_semicolon();
            }
            TokenKind::Break | TokenKind::Continue => {
                self.skip();
                if self.peek().kind == TokenKind::Identifier && !self.peek().has_leading_newline {
                    self.skip(); // label
                }
                self.consume_semicolon();
            }
            TokenKind::Try => self.parse_and_visit_try(v),
            TokenKind::Switch => self.parse_and_visit_switch(v),
            TokenKind::Import => {
                self.skip();
                match self.peek().kind {
                    // `import(…)` / `import.meta` are expressions.
                    TokenKind::LeftParen | TokenKind::Dot => {
                        self.lexer.rewind_to(token.begin);
                        self.parse_and_visit_expression_statement(v);
                    }
                    _ => self.parse_and_visit_import_declaration(v),
                }
            }
            TokenKind::Debugger => {
                self.skip();
                self.consume_semicolon();
            }
            TokenKind::EndOfFile => {}
            _ => self.parse_and_visit_expression_statement(v),
        }
    }

    fn parse_statements_until_right_brace(&mut self, v: &mut dyn Visitor<'a>) {
        loop {
            match self.peek().kind {
                TokenKind::RightBrace | TokenKind::EndOfFile => return,
                _ => self.parse_and_visit_statement(v),
            }
        }
    }

    fn parse_and_visit_expression_statement(&mut self, v: &mut dyn Visitor<'a>) {
        let before = self.peek().begin;
        let expression = self.parse_expression_internal();
        self.visit_expression(expression, v);
        if self.peek().begin == before && self.peek().kind != TokenKind::EndOfFile {
            // Nothing was consumed (a token no expression can start); force
            // progress.
            self.skip();
            return;
        }
        self.consume_semicolon();
    }

    /// Consume `;` if present, applying Automatic Semicolon Insertion: `}`,
    /// end of file, or a preceding line terminator end the statement
    /// silently. Otherwise report a missing semicolon at the end of the
    /// previous token.
    fn consume_semicolon(&mut self) {
        match self.peek().kind {
            TokenKind::Semicolon => self.skip(),
            TokenKind::RightBrace | TokenKind::EndOfFile => {}
            _ => {
                if self.peek().has_leading_newline {
                    self.lexer.insert_semicolon();
                    self.skip();
                } else {
                    self.reporter.report(Diag::MissingSemicolonAfterExpression {
                        position: Span::empty_at(self.lexer.end_of_previous_token()),
                    });
                }
            }
        }
    }

    fn parse_and_visit_parenthesized_condition(&mut self, v: &mut dyn Visitor<'a>) {
        if self.peek().kind == TokenKind::LeftParen {
            let lparen = self.peek().span();
            self.skip();
            let condition = self.parse_expression_internal();
            self.visit_expression(condition, v);
            if self.peek().kind == TokenKind::RightParen {
                self.skip();
            } else {
                self.reporter
                    .report(Diag::UnmatchedParenthesis { paren: lparen });
            }
        } else {
            let condition = self.parse_expression_internal();
            self.visit_expression(condition, v);
        }
    }

    /// Parse the declarator list of a `var`/`let`/`const` statement (shared
    /// with `for` heads, which is why the trailing semicolon is the caller's
    /// job). Emits initializer uses and one `variable_declaration` per bound
    /// name.
    fn parse_and_visit_declarators(
        &mut self,
        kind: VarKind,
        keyword_span: Span,
        v: &mut dyn Visitor<'a>,
    ) {
        let mut declared_any = false;
        let mut reported_any = false;
        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::Identifier => {
                    self.skip();
                    if self.peek().kind == TokenKind::Equal {
                        let equal_span = self.peek().span();
                        self.skip();
                        let init = self.parse_assignment_or_missing(equal_span);
                        self.visit_expression(init, v);
                    }
                    v.visit_variable_declaration(token.identifier_name(), kind);
                    declared_any = true;
                }
                TokenKind::LeftBracket | TokenKind::LeftBrace => {
                    // Destructuring pattern, possibly with `= init`.
                    if let Some(pattern) = self.parse_assignment_opt() {
                        self.visit_destructuring_declaration(pattern, kind, v);
                        declared_any = true;
                    }
                }
                TokenKind::Comma => {
                    self.reporter.report(Diag::StrayCommaInLetStatement {
                        comma: token.span(),
                    });
                    reported_any = true;
                    self.skip();
                    continue;
                }
                TokenKind::Semicolon
                | TokenKind::RightBrace
                | TokenKind::EndOfFile
                | TokenKind::In
                | TokenKind::Of => break,
                _ => {
                    self.reporter.report(Diag::InvalidBindingInLetStatement {
                        binding: token.span(),
                    });
                    reported_any = true;
                    // Consume the junk (e.g. `let 42 = x`) so parsing can
                    // continue past it.
                    if self.parse_assignment_opt().is_none() {
                        self.skip();
                    }
                }
            }
            match self.peek().kind {
                TokenKind::Comma => self.skip(),
                TokenKind::Identifier if !self.peek().has_leading_newline => {
                    self.reporter.report(Diag::UnexpectedIdentifier {
                        identifier: self.peek().span(),
                    });
                    reported_any = true;
                    // The identifier becomes the next declarator.
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus
                    if !self.peek().has_leading_newline =>
                {
                    // `let\nx++` — the `++` starts the next statement.
                    self.lexer.insert_semicolon();
                    break;
                }
                _ => break,
            }
        }
        if !declared_any && !reported_any {
            self.reporter.report(Diag::LetWithNoBindings {
                statement: keyword_span,
            });
        }
    }

    /// A destructuring declarator parsed as an expression: split `pattern =
    /// init` and declare every identifier bound by the pattern.
    fn visit_destructuring_declaration(
        &mut self,
        pattern: ExprId,
        kind: VarKind,
        v: &mut dyn Visitor<'a>,
    ) {
        let assignment = match self.arena.get(pattern) {
            Expr::Assignment { lhs, rhs } => Some((*lhs, *rhs)),
            _ => None,
        };
        match assignment {
            Some((lhs, rhs)) => {
                self.visit_expression(rhs, v);
                self.visit_binding_element(lhs, kind, v);
            }
            None => self.visit_binding_element(pattern, kind, v),
        }
    }

    fn parse_and_visit_function_declaration(
        &mut self,
        _attributes: FunctionAttributes,
        v: &mut dyn Visitor<'a>,
    ) {
        self.skip(); // `function`
        if self.peek().kind == TokenKind::Identifier
            || self.peek().kind.is_contextual_keyword()
        {
            let name = self.peek().identifier_name();
            self.skip();
            v.visit_variable_declaration(name, VarKind::Function);
        }
        v.visit_enter_function_scope();
        self.parse_function_parameters_and_body(v);
        v.visit_exit_function_scope();
    }

    fn parse_and_visit_class(&mut self, v: &mut dyn Visitor<'a>) {
        self.skip(); // `class`
        if self.peek().kind == TokenKind::Identifier
            || self.peek().kind.is_contextual_keyword()
        {
            let name = self.peek().identifier_name();
            self.skip();
            v.visit_variable_declaration(name, VarKind::Class);
        }
        if self.peek().kind == TokenKind::Extends {
            self.skip();
            match self.parse_postfix_opt(false) {
                Some(superclass) => self.visit_expression(superclass, v),
                None => {
                    let span = self.peek().span();
                    self.reporter
                        .report(Diag::MissingOperandForOperator { operator: span });
                }
            }
        }
        v.visit_enter_class_scope();
        if self.peek().kind == TokenKind::LeftBrace {
            self.skip();
            self.parse_and_visit_class_body(v);
        }
        v.visit_exit_class_scope();
    }

    fn parse_and_visit_class_body(&mut self, v: &mut dyn Visitor<'a>) {
        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::RightBrace => {
                    self.skip();
                    return;
                }
                TokenKind::EndOfFile => return,
                TokenKind::Semicolon
                | TokenKind::Static
                | TokenKind::Async
                | TokenKind::Star => self.skip(),
                TokenKind::Get | TokenKind::Set => {
                    self.skip();
                    if self.peek().kind == TokenKind::LeftParen {
                        // A method actually named `get`/`set`.
                        v.visit_property_declaration(token.identifier_name());
                        self.parse_and_visit_method(v);
                    } else {
                        self.parse_and_visit_class_member_after_modifier(v);
                    }
                }
                _ if token.kind == TokenKind::Identifier
                    || token.kind.is_keyword()
                    || matches!(token.kind, TokenKind::String | TokenKind::Number) =>
                {
                    self.skip();
                    if token.kind == TokenKind::Identifier || token.kind.is_keyword() {
                        v.visit_property_declaration(token.identifier_name());
                    }
                    self.parse_and_visit_class_member_tail(v);
                }
                TokenKind::LeftBracket => {
                    self.skip();
                    let lb = token.span();
                    let key = self.parse_expression_internal();
                    self.visit_expression(key, v);
                    if self.peek().kind == TokenKind::RightBracket {
                        self.skip();
                    } else {
                        self.reporter.report(Diag::UnmatchedParenthesis { paren: lb });
                    }
                    self.parse_and_visit_class_member_tail(v);
                }
                _ => self.skip(),
            }
        }
    }

    fn parse_and_visit_class_member_after_modifier(&mut self, v: &mut dyn Visitor<'a>) {
        let token = *self.peek();
        if matches!(token.kind, TokenKind::Identifier | TokenKind::String | TokenKind::Number)
            || token.kind.is_keyword()
        {
            self.skip();
            if token.kind != TokenKind::String && token.kind != TokenKind::Number {
                v.visit_property_declaration(token.identifier_name());
            }
            self.parse_and_visit_class_member_tail(v);
        } else if token.kind == TokenKind::LeftBracket {
            self.skip();
            let key = self.parse_expression_internal();
            self.visit_expression(key, v);
            if self.peek().kind == TokenKind::RightBracket {
                self.skip();
            }
            self.parse_and_visit_class_member_tail(v);
        }
    }

    fn parse_and_visit_class_member_tail(&mut self, v: &mut dyn Visitor<'a>) {
        match self.peek().kind {
            TokenKind::LeftParen => self.parse_and_visit_method(v),
            TokenKind::Equal => {
                let equal_span = self.peek().span();
                self.skip();
                let init = self.parse_assignment_or_missing(equal_span);
                self.visit_expression(init, v);
                if self.peek().kind == TokenKind::Semicolon {
                    self.skip();
                }
            }
            TokenKind::Semicolon => self.skip(),
            _ => {}
        }
    }

    fn parse_and_visit_method(&mut self, v: &mut dyn Visitor<'a>) {
        v.visit_enter_function_scope();
        self.parse_function_parameters_and_body(v);
        v.visit_exit_function_scope();
    }

    fn parse_and_visit_for(&mut self, v: &mut dyn Visitor<'a>) {
        self.skip(); // `for`
        let lparen = if self.peek().kind == TokenKind::LeftParen {
            let span = self.peek().span();
            self.skip();
            Some(span)
        } else {
            None
        };
        let mut opened_for_scope = false;
        let mut is_for_in_of = false;
        match self.peek().kind {
            TokenKind::Semicolon => self.skip(),
            TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                let keyword = *self.peek();
                let kind = match keyword.kind {
                    TokenKind::Let => VarKind::Let,
                    TokenKind::Const => VarKind::Const,
                    _ => VarKind::Var,
                };
                self.skip();
                if kind != VarKind::Var {
                    v.visit_enter_for_scope();
                    opened_for_scope = true;
                }
                self.parse_and_visit_declarators(kind, keyword.span(), v);
                match self.peek().kind {
                    TokenKind::In | TokenKind::Of => {
                        is_for_in_of = true;
                        self.skip();
                        let iterable = self.parse_expression_internal();
                        self.visit_expression(iterable, v);
                    }
                    TokenKind::Semicolon => self.skip(),
                    _ => {}
                }
            }
            _ => {
                self.in_is_operator = false;
                let init = self.parse_expression_internal();
                self.in_is_operator = true;
                match self.peek().kind {
                    TokenKind::In | TokenKind::Of => {
                        is_for_in_of = true;
                        self.skip();
                        self.visit_assignment_target(init, v);
                        let iterable = self.parse_expression_internal();
                        self.visit_expression(iterable, v);
                    }
                    _ => {
                        self.visit_expression(init, v);
                        if self.peek().kind == TokenKind::Semicolon {
                            self.skip();
                        }
                    }
                }
            }
        }
        if !is_for_in_of {
            // Condition.
            match self.peek().kind {
                TokenKind::Semicolon => self.skip(),
                TokenKind::RightParen | TokenKind::EndOfFile => {}
                _ => {
                    let condition = self.parse_expression_internal();
                    self.visit_expression(condition, v);
                    if self.peek().kind == TokenKind::Semicolon {
                        self.skip();
                    }
                }
            }
            // Update.
            match self.peek().kind {
                TokenKind::RightParen | TokenKind::EndOfFile => {}
                _ => {
                    let update = self.parse_expression_internal();
                    self.visit_expression(update, v);
                }
            }
        }
        if self.peek().kind == TokenKind::RightParen {
            self.skip();
        } else if let Some(lparen) = lparen {
            self.reporter
                .report(Diag::UnmatchedParenthesis { paren: lparen });
        }
        self.parse_and_visit_statement(v);
        if opened_for_scope {
            v.visit_exit_for_scope();
        }
    }

    fn parse_and_visit_try(&mut self, v: &mut dyn Visitor<'a>) {
        self.skip(); // `try`
        if self.peek().kind == TokenKind::LeftBrace {
            self.skip();
            v.visit_enter_block_scope();
            self.parse_statements_until_right_brace(v);
            if self.peek().kind == TokenKind::RightBrace {
                self.skip();
            }
            v.visit_exit_block_scope();
        }
        if self.peek().kind == TokenKind::Catch {
            self.skip();
            v.visit_enter_block_scope();
            if self.peek().kind == TokenKind::LeftParen {
                let lparen = self.peek().span();
                self.skip();
                if let Some(binding) = self.parse_assignment_opt() {
                    self.visit_binding_element(binding, VarKind::Catch, v);
                }
                if self.peek().kind == TokenKind::RightParen {
                    self.skip();
                } else {
                    self.reporter
                        .report(Diag::UnmatchedParenthesis { paren: lparen });
                }
            }
            if self.peek().kind == TokenKind::LeftBrace {
                self.skip();
                self.parse_statements_until_right_brace(v);
                if self.peek().kind == TokenKind::RightBrace {
                    self.skip();
                }
            }
            v.visit_exit_block_scope();
        }
        if self.peek().kind == TokenKind::Finally {
            self.skip();
            if self.peek().kind == TokenKind::LeftBrace {
                self.skip();
                v.visit_enter_block_scope();
                self.parse_statements_until_right_brace(v);
                if self.peek().kind == TokenKind::RightBrace {
                    self.skip();
                }
                v.visit_exit_block_scope();
            }
        }
    }

    fn parse_and_visit_switch(&mut self, v: &mut dyn Visitor<'a>) {
        self.skip(); // `switch`
        self.parse_and_visit_parenthesized_condition(v);
        if self.peek().kind != TokenKind::LeftBrace {
            return;
        }
        self.skip();
        v.visit_enter_block_scope();
        loop {
            match self.peek().kind {
                TokenKind::Case => {
                    self.skip();
                    let test = self.parse_expression_internal();
                    self.visit_expression(test, v);
                    if self.peek().kind == TokenKind::Colon {
                        self.skip();
                    }
                }
                TokenKind::Default => {
                    self.skip();
                    if self.peek().kind == TokenKind::Colon {
                        self.skip();
                    }
                }
                TokenKind::RightBrace => {
                    self.skip();
                    break;
                }
                TokenKind::EndOfFile => break,
                _ => self.parse_and_visit_statement(v),
            }
        }
        v.visit_exit_block_scope();
    }

    fn parse_and_visit_import_declaration(&mut self, v: &mut dyn Visitor<'a>) {
        // `import` has been consumed.
        match self.peek().kind {
            TokenKind::String => {
                // Side-effect import: `import 'module';`
                self.skip();
                self.consume_semicolon();
                return;
            }
            TokenKind::Identifier => {
                let name = self.peek().identifier_name();
                self.skip();
                v.visit_variable_declaration(name, VarKind::Import);
                if self.peek().kind == TokenKind::Comma {
                    self.skip();
                    self.parse_import_clause(v);
                }
            }
            TokenKind::LeftBrace | TokenKind::Star => self.parse_import_clause(v),
            _ => {}
        }
        if self.peek().kind == TokenKind::From {
            self.skip();
            if self.peek().kind == TokenKind::String {
                self.skip();
            }
        }
        self.consume_semicolon();
    }

    fn parse_import_clause(&mut self, v: &mut dyn Visitor<'a>) {
        match self.peek().kind {
            TokenKind::LeftBrace => {
                self.skip();
                loop {
                    let token = *self.peek();
                    match token.kind {
                        TokenKind::RightBrace => {
                            self.skip();
                            return;
                        }
                        TokenKind::EndOfFile => return,
                        TokenKind::Comma => self.skip(),
                        _ if token.kind == TokenKind::Identifier || token.kind.is_keyword() => {
                            self.skip();
                            if self.peek().kind == TokenKind::As {
                                self.skip();
                                if self.peek().kind == TokenKind::Identifier {
                                    let local = self.peek().identifier_name();
                                    self.skip();
                                    v.visit_variable_declaration(local, VarKind::Import);
                                }
                            } else {
                                v.visit_variable_declaration(
                                    token.identifier_name(),
                                    VarKind::Import,
                                );
                            }
                        }
                        _ => self.skip(),
                    }
                }
            }
            TokenKind::Star => {
                self.skip();
                if self.peek().kind == TokenKind::As {
                    self.skip();
                    if self.peek().kind == TokenKind::Identifier {
                        let local = self.peek().identifier_name();
                        self.skip();
                        v.visit_variable_declaration(local, VarKind::Import);
                    }
                }
            }
            _ => {}
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Expression visiting
    // ────────────────────────────────────────────────────────────────────────

    /// Walk `id` emitting variable uses/assignments, draining buffered
    /// function bodies in source order.
    pub fn visit_expression(&mut self, id: ExprId, v: &mut dyn Visitor<'a>) {
        enum Plan<'a> {
            Nothing,
            Use(Ident<'a>),
            TypeofUse(Ident<'a>),
            Child(ExprId),
            Children(ExprList),
            RwUnary(ExprId),
            Assign(ExprId, ExprId),
            Object(Vec<ObjectEntry>),
            FunctionVisits,
            ArrowExpr(ExprList, ExprId),
            ArrowBlock(ExprList),
        }
        let plan = match self.arena.get(id) {
            Expr::Invalid { .. }
            | Expr::Literal { .. }
            | Expr::Import { .. }
            | Expr::NewTarget { .. }
            | Expr::Super { .. } => Plan::Nothing,
            Expr::Variable { name } => Plan::Use(*name),
            Expr::Typeof { child, .. } => match self.arena.get(*child) {
                Expr::Variable { name } => Plan::TypeofUse(*name),
                _ => Plan::Child(*child),
            },
            Expr::Dot { object, .. } => Plan::Child(*object),
            Expr::Index {
                object, subscript, ..
            } => Plan::Children(smallvec![*object, *subscript]),
            Expr::Unary { child, .. }
            | Expr::Await { child, .. }
            | Expr::Spread { child, .. } => Plan::Child(*child),
            Expr::RwUnaryPrefix { child, .. } | Expr::RwUnarySuffix { child, .. } => {
                Plan::RwUnary(*child)
            }
            Expr::Call { children, .. }
            | Expr::New { children, .. }
            | Expr::Binary { children }
            | Expr::Template { children, .. }
            | Expr::TaggedTemplate { children, .. }
            | Expr::Array { children, .. } => Plan::Children(children.clone()),
            Expr::Conditional {
                condition,
                true_branch,
                false_branch,
            } => Plan::Children(smallvec![*condition, *true_branch, *false_branch]),
            Expr::Assignment { lhs, rhs } | Expr::CompoundAssignment { lhs, rhs } => {
                Plan::Assign(*lhs, *rhs)
            }
            Expr::Object { entries, .. } => Plan::Object(entries.clone()),
            Expr::Function { .. } | Expr::NamedFunction { .. } => Plan::FunctionVisits,
            Expr::ArrowWithExpression {
                parameters, body, ..
            } => Plan::ArrowExpr(parameters.clone(), *body),
            Expr::ArrowWithStatements { parameters, .. } => Plan::ArrowBlock(parameters.clone()),
        };
        match plan {
            Plan::Nothing => {}
            Plan::Use(name) => v.visit_variable_use(name),
            Plan::TypeofUse(name) => v.visit_variable_typeof_use(name),
            Plan::Child(child) => self.visit_expression(child, v),
            Plan::Children(children) => {
                for child in children {
                    self.visit_expression(child, v);
                }
            }
            Plan::RwUnary(child) => {
                // `++x` both reads and writes x.
                let variable = match self.arena.get(child) {
                    Expr::Variable { name } => Some(*name),
                    _ => None,
                };
                match variable {
                    Some(name) => {
                        v.visit_variable_use(name);
                        v.visit_variable_assignment(name);
                    }
                    None => self.visit_expression(child, v),
                }
            }
            Plan::Assign(lhs, rhs) => {
                self.visit_expression(rhs, v);
                self.visit_assignment_target(lhs, v);
            }
            Plan::Object(entries) => {
                for entry in entries {
                    if let Some(property) = entry.property {
                        self.visit_expression(property, v);
                    }
                    self.visit_expression(entry.value, v);
                }
            }
            Plan::FunctionVisits => {
                let visits = self.arena.take_child_visits(id);
                visits.move_into(v);
            }
            Plan::ArrowExpr(parameters, body) => {
                v.visit_enter_function_scope();
                for parameter in parameters {
                    self.visit_binding_element(parameter, VarKind::Parameter, v);
                }
                v.visit_enter_function_scope_body();
                self.visit_expression(body, v);
                v.visit_exit_function_scope();
            }
            Plan::ArrowBlock(parameters) => {
                v.visit_enter_function_scope();
                for parameter in parameters {
                    self.visit_binding_element(parameter, VarKind::Parameter, v);
                }
                v.visit_enter_function_scope_body();
                let visits = self.arena.take_child_visits(id);
                visits.move_into(v);
                v.visit_exit_function_scope();
            }
        }
    }

    /// Walk an assignment target, emitting `variable_assignment` for bound
    /// names and plain uses for everything read along the way.
    fn visit_assignment_target(&mut self, id: ExprId, v: &mut dyn Visitor<'a>) {
        enum Plan<'a> {
            Assign(Ident<'a>),
            Expr,
            Child(ExprId),
            Children(ExprList),
            Targets(ExprList),
            DefaultValue(ExprId, ExprId),
            Object(Vec<ObjectEntry>),
        }
        let plan = match self.arena.get(id) {
            Expr::Variable { name } => Plan::Assign(*name),
            Expr::Dot { object, .. } => Plan::Child(*object),
            Expr::Index {
                object, subscript, ..
            } => Plan::Children(smallvec![*object, *subscript]),
            Expr::Array { children, .. } => Plan::Targets(children.clone()),
            Expr::Spread { child, .. } => {
                let child = *child;
                return self.visit_assignment_target(child, v);
            }
            Expr::Assignment { lhs, rhs } => Plan::DefaultValue(*lhs, *rhs),
            Expr::Object { entries, .. } => Plan::Object(entries.clone()),
            _ => Plan::Expr,
        };
        match plan {
            Plan::Assign(name) => v.visit_variable_assignment(name),
            Plan::Expr => self.visit_expression(id, v),
            Plan::Child(child) => self.visit_expression(child, v),
            Plan::Children(children) => {
                for child in children {
                    self.visit_expression(child, v);
                }
            }
            Plan::Targets(children) => {
                for child in children {
                    self.visit_assignment_target(child, v);
                }
            }
            Plan::DefaultValue(lhs, rhs) => {
                self.visit_expression(rhs, v);
                self.visit_assignment_target(lhs, v);
            }
            Plan::Object(entries) => {
                for entry in entries {
                    if let Some(property) = entry.property {
                        self.visit_expression(property, v);
                    }
                    self.visit_assignment_target(entry.value, v);
                }
            }
        }
    }

    /// Declare every identifier bound by a binding pattern (`x`, `[a, b]`,
    /// `{k: v, d = init}`, `...rest`), visiting default values as uses.
    fn visit_binding_element(&mut self, id: ExprId, kind: VarKind, v: &mut dyn Visitor<'a>) {
        enum Plan<'a> {
            Nothing,
            Declare(Ident<'a>),
            Element(ExprId),
            Elements(ExprList),
            DefaultValue(ExprId, ExprId),
            Object(Vec<ObjectEntry>),
        }
        let plan = match self.arena.get(id) {
            Expr::Variable { name } => Plan::Declare(*name),
            Expr::Assignment { lhs, rhs } => Plan::DefaultValue(*lhs, *rhs),
            Expr::Spread { child, .. } => Plan::Element(*child),
            Expr::Array { children, .. } => Plan::Elements(children.clone()),
            Expr::Object { entries, .. } => Plan::Object(entries.clone()),
            _ => Plan::Nothing,
        };
        match plan {
            Plan::Nothing => {}
            Plan::Declare(name) => v.visit_variable_declaration(name, kind),
            Plan::Element(child) => self.visit_binding_element(child, kind, v),
            Plan::Elements(children) => {
                for child in children {
                    self.visit_binding_element(child, kind, v);
                }
            }
            Plan::DefaultValue(lhs, rhs) => {
                self.visit_expression(rhs, v);
                self.visit_binding_element(lhs, kind, v);
            }
            Plan::Object(entries) => {
                for entry in entries {
                    if let Some(property) = entry.property {
                        self.visit_expression(property, v);
                    }
                    self.visit_binding_element(entry.value, kind, v);
                }
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Expressions
    // ────────────────────────────────────────────────────────────────────────

    /// Parse one expression at the lowest (comma) precedence level.
    pub fn parse_expression(&mut self) -> ExprId {
        self.parse_expression_internal()
    }

    fn parse_expression_internal(&mut self) -> ExprId {
        match self.parse_comma_opt() {
            Some(expression) => expression,
            None => {
                let span = self.peek().span();
                self.reporter
                    .report(Diag::MissingOperandForOperator { operator: span });
                self.make_invalid(span)
            }
        }
    }

    fn parse_comma_opt(&mut self) -> Option<ExprId> {
        let mut first = self.parse_assignment_opt();
        if self.peek().kind != TokenKind::Comma {
            return first;
        }
        let mut children: ExprList = smallvec![];
        while self.peek().kind == TokenKind::Comma {
            let operator = self.peek().span();
            if children.is_empty() {
                let lhs = first.take().unwrap_or_else(|| self.missing_operand(operator));
                children.push(lhs);
            }
            self.skip();
            match self.parse_assignment_opt() {
                Some(operand) => children.push(operand),
                None => {
                    let operand = self.missing_operand(operator);
                    children.push(operand);
                }
            }
        }
        Some(self.arena.alloc(Expr::Binary { children }))
    }

    fn parse_assignment_opt(&mut self) -> Option<ExprId> {
        let lhs = self.parse_conditional_opt()?;
        let kind = self.peek().kind;
        let is_compound = compound_assignment_kind(kind);
        if kind != TokenKind::Equal && !is_compound {
            return Some(lhs);
        }
        if !matches!(
            self.arena.get(lhs),
            Expr::Variable { .. }
                | Expr::Dot { .. }
                | Expr::Index { .. }
                | Expr::Array { .. }
                | Expr::Object { .. }
        ) {
            self.reporter.report(Diag::InvalidExpressionLeftOfAssignment {
                expression: self.arena.span(lhs),
            });
        }
        let operator = self.peek().span();
        self.skip();
        let rhs = self.parse_assignment_or_missing(operator);
        let node = if is_compound {
            Expr::CompoundAssignment { lhs, rhs }
        } else {
            Expr::Assignment { lhs, rhs }
        };
        Some(self.arena.alloc(node))
    }

    fn parse_assignment_or_missing(&mut self, operator: Span) -> ExprId {
        match self.parse_assignment_opt() {
            Some(expression) => expression,
            None => self.missing_operand(operator),
        }
    }

    fn parse_conditional_opt(&mut self) -> Option<ExprId> {
        let condition = self.parse_binary_opt(0)?;
        if self.peek().kind != TokenKind::Question {
            return Some(condition);
        }
        let question = self.peek().span();
        self.skip();
        let true_branch = self.parse_assignment_or_missing(question);
        let false_branch = if self.peek().kind == TokenKind::Colon {
            let colon = self.peek().span();
            self.skip();
            self.parse_assignment_or_missing(colon)
        } else {
            self.missing_operand(question)
        };
        Some(self.arena.alloc(Expr::Conditional {
            condition,
            true_branch,
            false_branch,
        }))
    }

    fn binary_operator_at(&self, level: usize) -> bool {
        let kind = self.lexer.peek().kind;
        if kind == TokenKind::In && !self.in_is_operator {
            return false;
        }
        BINARY_LEVELS[level].contains(&kind)
    }

    fn parse_binary_opt(&mut self, level: usize) -> Option<ExprId> {
        if level == BINARY_LEVELS.len() {
            return self.parse_exponent_opt();
        }
        let mut first = self.parse_binary_opt(level + 1);
        if !self.binary_operator_at(level) {
            return first;
        }
        let mut children: ExprList = smallvec![];
        while self.binary_operator_at(level) {
            let operator = self.peek().span();
            if children.is_empty() {
                let lhs = first.take().unwrap_or_else(|| self.missing_operand(operator));
                children.push(lhs);
            }
            self.skip();
            match self.parse_binary_opt(level + 1) {
                Some(operand) => children.push(operand),
                None => {
                    let operand = self.missing_operand(operator);
                    children.push(operand);
                }
            }
        }
        Some(self.arena.alloc(Expr::Binary { children }))
    }

    fn parse_exponent_opt(&mut self) -> Option<ExprId> {
        let base = self.parse_unary_opt()?;
        if self.peek().kind != TokenKind::StarStar {
            return Some(base);
        }
        let operator = self.peek().span();
        self.skip();
        // `**` is right-associative, so the chain nests instead of
        // flattening.
        let rhs = match self.parse_exponent_opt() {
            Some(rhs) => rhs,
            None => self.missing_operand(operator),
        };
        Some(self.arena.alloc(Expr::Binary {
            children: smallvec![base, rhs],
        }))
    }

    fn parse_unary_opt(&mut self) -> Option<ExprId> {
        let token = *self.peek();
        let begin = token.begin;
        let span = token.span();
        let node = match token.kind {
            TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Delete
            | TokenKind::Void => {
                self.skip();
                let child = self.parse_unary_or_missing(span);
                Expr::Unary { child, begin }
            }
            TokenKind::Typeof => {
                self.skip();
                let child = self.parse_unary_or_missing(span);
                Expr::Typeof { child, begin }
            }
            TokenKind::Await => {
                self.skip();
                let child = self.parse_unary_or_missing(span);
                Expr::Await { child, begin }
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.skip();
                let child = self.parse_unary_or_missing(span);
                Expr::RwUnaryPrefix { child, begin }
            }
            TokenKind::DotDotDot => {
                self.skip();
                let child = self.parse_unary_or_missing(span);
                Expr::Spread { child, begin }
            }
            _ => return self.parse_postfix_opt(false),
        };
        Some(self.arena.alloc(node))
    }

    fn parse_unary_or_missing(&mut self, operator: Span) -> ExprId {
        match self.parse_unary_opt() {
            Some(expression) => expression,
            None => self.missing_operand(operator),
        }
    }

    fn parse_postfix_opt(&mut self, stop_at_call: bool) -> Option<ExprId> {
        let mut expression = self.parse_primary_opt()?;
        loop {
            let token = *self.peek();
            match token.kind {
                TokenKind::Dot => {
                    self.skip();
                    expression = self.parse_dot_property(expression, token.span());
                }
                TokenKind::QuestionDot => {
                    self.skip();
                    match self.peek().kind {
                        TokenKind::LeftParen if !stop_at_call => {
                            expression = self.parse_call_arguments(expression);
                        }
                        TokenKind::LeftBracket => {
                            expression = self.parse_index(expression);
                        }
                        _ => expression = self.parse_dot_property(expression, token.span()),
                    }
                }
                TokenKind::LeftBracket => {
                    expression = self.parse_index(expression);
                }
                TokenKind::LeftParen if !stop_at_call => {
                    expression = self.parse_call_arguments(expression);
                }
                TokenKind::CompleteTemplate => {
                    self.skip();
                    expression = self.arena.alloc(Expr::TaggedTemplate {
                        children: smallvec![expression],
                        end: token.end,
                    });
                }
                TokenKind::IncompleteTemplate => {
                    let (substitutions, end) = self.parse_template_rest(token.begin);
                    let mut children: ExprList = smallvec![expression];
                    children.extend(substitutions);
                    expression = self.arena.alloc(Expr::TaggedTemplate { children, end });
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    if token.has_leading_newline {
                        // A line terminator forbids the postfix reading; end
                        // the statement here instead (ASI).
                        self.lexer.insert_semicolon();
                        break;
                    }
                    self.skip();
                    expression = self.arena.alloc(Expr::RwUnarySuffix {
                        child: expression,
                        end: token.end,
                    });
                }
                TokenKind::Arrow => {
                    if matches!(self.arena.get(expression), Expr::Variable { .. }) {
                        self.skip();
                        return Some(self.parse_arrow_tail(
                            FunctionAttributes::Normal,
                            smallvec![expression],
                            None,
                            token.span(),
                        ));
                    }
                    break;
                }
                _ => break,
            }
        }
        Some(expression)
    }

    fn parse_dot_property(&mut self, object: ExprId, dot_span: Span) -> ExprId {
        let token = *self.peek();
        if token.kind == TokenKind::Identifier || token.kind.is_keyword() {
            self.skip();
            self.arena.alloc(Expr::Dot {
                object,
                property: token.identifier_name(),
            })
        } else {
            self.reporter
                .report(Diag::MissingOperandForOperator { operator: dot_span });
            self.arena.alloc(Expr::Dot {
                object,
                property: Ident {
                    span: Span::empty_at(dot_span.end),
                    name: "",
                },
            })
        }
    }

    fn parse_index(&mut self, object: ExprId) -> ExprId {
        let lbracket = self.peek().span();
        self.skip();
        let subscript = if self.peek().kind == TokenKind::RightBracket {
            self.missing_operand(lbracket)
        } else {
            self.parse_expression_internal()
        };
        let end;
        if self.peek().kind == TokenKind::RightBracket {
            end = self.peek().end;
            self.skip();
        } else {
            self.reporter
                .report(Diag::UnmatchedParenthesis { paren: lbracket });
            end = self.lexer.end_of_previous_token();
        }
        self.arena.alloc(Expr::Index {
            object,
            subscript,
            end,
        })
    }

    /// Parse `(args…)` after `callee`.
    fn parse_call_arguments(&mut self, callee: ExprId) -> ExprId {
        let mut children: ExprList = smallvec![callee];
        let end = self.parse_argument_list(&mut children);
        self.arena.alloc(Expr::Call { children, end })
    }

    /// Parse a parenthesized argument list into `arguments`; returns the end
    /// offset of the `)`.
    fn parse_argument_list(&mut self, arguments: &mut ExprList) -> u32 {
        let lparen = self.peek().span();
        self.skip();
        loop {
            match self.peek().kind {
                TokenKind::RightParen => {
                    let end = self.peek().end;
                    self.skip();
                    return end;
                }
                TokenKind::EndOfFile => {
                    self.reporter
                        .report(Diag::UnmatchedParenthesis { paren: lparen });
                    return self.lexer.end_of_previous_token();
                }
                TokenKind::Comma => {
                    let comma = self.peek().span();
                    self.reporter
                        .report(Diag::MissingOperandForOperator { operator: comma });
                    self.skip();
                }
                _ => {
                    match self.parse_assignment_opt() {
                        Some(argument) => arguments.push(argument),
                        None => {
                            self.reporter
                                .report(Diag::UnmatchedParenthesis { paren: lparen });
                            return self.lexer.end_of_previous_token();
                        }
                    }
                    if self.peek().kind == TokenKind::Comma {
                        self.skip();
                    }
                }
            }
        }
    }

    fn parse_primary_opt(&mut self) -> Option<ExprId> {
        let token = *self.peek();
        match token.kind {
            TokenKind::Number
            | TokenKind::String
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::CompleteTemplate => {
                self.skip();
                Some(self.arena.alloc(Expr::Literal { span: token.span() }))
            }
            TokenKind::Slash | TokenKind::SlashEqual => {
                self.lexer.reparse_as_regexp();
                let span = self.peek().span();
                self.skip();
                Some(self.arena.alloc(Expr::Literal { span }))
            }
            TokenKind::IncompleteTemplate => {
                let (children, end) = self.parse_template_rest(token.begin);
                Some(self.arena.alloc(Expr::Template {
                    children,
                    span: Span::new(token.begin, end),
                }))
            }
            TokenKind::Identifier => {
                self.skip();
                Some(self.arena.alloc(Expr::Variable {
                    name: token.identifier_name(),
                }))
            }
            TokenKind::Async => self.parse_async_tail(token),
            kind if kind.is_contextual_keyword() => {
                self.skip();
                Some(self.arena.alloc(Expr::Variable {
                    name: token.identifier_name(),
                }))
            }
            TokenKind::Function => {
                Some(self.parse_function_expression(FunctionAttributes::Normal, token.begin))
            }
            TokenKind::New => Some(self.parse_new_expression(token)),
            TokenKind::Import => {
                self.skip();
                Some(self.arena.alloc(Expr::Import { span: token.span() }))
            }
            TokenKind::Super => {
                self.skip();
                Some(self.arena.alloc(Expr::Super { span: token.span() }))
            }
            TokenKind::LeftBracket => Some(self.parse_array_literal()),
            TokenKind::LeftBrace => Some(self.parse_object_literal()),
            TokenKind::LeftParen => self.parse_parenthesized_or_arrow(),
            _ => None,
        }
    }

    fn parse_new_expression(&mut self, new_token: Token<'a>) -> ExprId {
        self.skip(); // `new`
        if self.peek().kind == TokenKind::Dot {
            self.skip();
            if self.peek().kind == TokenKind::Target {
                let end = self.peek().end;
                self.skip();
                return self.arena.alloc(Expr::NewTarget {
                    span: Span::new(new_token.begin, end),
                });
            }
            let span = self.peek().span();
            self.reporter
                .report(Diag::UnexpectedIdentifier { identifier: span });
            return self.make_invalid(Span::new(new_token.begin, span.end));
        }
        let callee = match self.parse_postfix_opt(true) {
            Some(callee) => callee,
            None => self.missing_operand(new_token.span()),
        };
        let mut children: ExprList = smallvec![callee];
        let end = if self.peek().kind == TokenKind::LeftParen {
            self.parse_argument_list(&mut children)
        } else {
            self.arena.span(callee).end
        };
        self.arena.alloc(Expr::New {
            children,
            span: Span::new(new_token.begin, end),
        })
    }

    /// Parse what follows the contextual keyword `async`: an async function
    /// expression, an async arrow, or just the identifier `async`.
    fn parse_async_tail(&mut self, async_token: Token<'a>) -> Option<ExprId> {
        let begin = async_token.begin;
        self.skip(); // `async`
        match self.peek().kind {
            TokenKind::Function => {
                Some(self.parse_function_expression(FunctionAttributes::Async, begin))
            }
            TokenKind::Identifier => {
                let parameter_token = *self.peek();
                self.skip();
                if self.peek().kind == TokenKind::Arrow {
                    let arrow = self.peek().span();
                    self.skip();
                    let parameter = self.arena.alloc(Expr::Variable {
                        name: parameter_token.identifier_name(),
                    });
                    Some(self.parse_arrow_tail(
                        FunctionAttributes::Async,
                        smallvec![parameter],
                        Some(begin),
                        arrow,
                    ))
                } else {
                    self.reporter.report(Diag::UnexpectedIdentifier {
                        identifier: parameter_token.span(),
                    });
                    Some(self.arena.alloc(Expr::Variable {
                        name: async_token.identifier_name(),
                    }))
                }
            }
            TokenKind::LeftParen => {
                let lparen = self.peek().span();
                self.skip();
                if self.peek().kind == TokenKind::RightParen {
                    let rparen_end = self.peek().end;
                    self.skip();
                    if self.peek().kind == TokenKind::Arrow {
                        let arrow = self.peek().span();
                        self.skip();
                        return Some(self.parse_arrow_tail(
                            FunctionAttributes::Async,
                            smallvec![],
                            Some(begin),
                            arrow,
                        ));
                    }
                    let callee = self.arena.alloc(Expr::Variable {
                        name: async_token.identifier_name(),
                    });
                    return Some(self.arena.alloc(Expr::Call {
                        children: smallvec![callee],
                        end: rparen_end,
                    }));
                }
                let inner = self.parse_expression_internal();
                let rparen_end;
                if self.peek().kind == TokenKind::RightParen {
                    rparen_end = self.peek().end;
                    self.skip();
                } else {
                    self.reporter
                        .report(Diag::UnmatchedParenthesis { paren: lparen });
                    rparen_end = self.lexer.end_of_previous_token();
                }
                if self.peek().kind == TokenKind::Arrow {
                    let arrow = self.peek().span();
                    self.skip();
                    let parameters = self.flatten_comma_chain(inner);
                    Some(self.parse_arrow_tail(
                        FunctionAttributes::Async,
                        parameters,
                        Some(begin),
                        arrow,
                    ))
                } else {
                    let callee = self.arena.alloc(Expr::Variable {
                        name: async_token.identifier_name(),
                    });
                    let mut children: ExprList = smallvec![callee];
                    children.extend(self.flatten_comma_chain(inner));
                    Some(self.arena.alloc(Expr::Call {
                        children,
                        end: rparen_end,
                    }))
                }
            }
            _ => Some(self.arena.alloc(Expr::Variable {
                name: async_token.identifier_name(),
            })),
        }
    }

    fn parse_parenthesized_or_arrow(&mut self) -> Option<ExprId> {
        let lparen = self.peek().span();
        self.skip();
        if self.peek().kind == TokenKind::RightParen {
            let rparen_end = self.peek().end;
            self.skip();
            if self.peek().kind == TokenKind::Arrow {
                let arrow = self.peek().span();
                self.skip();
                return Some(self.parse_arrow_tail(
                    FunctionAttributes::Normal,
                    smallvec![],
                    Some(lparen.begin),
                    arrow,
                ));
            }
            // `()` with no arrow has no expression inside.
            let span = Span::new(lparen.begin, rparen_end);
            self.reporter
                .report(Diag::MissingOperandForOperator { operator: span });
            return Some(self.make_invalid(span));
        }
        let inner = self.parse_expression_internal();
        if self.peek().kind == TokenKind::RightParen {
            self.skip();
        } else {
            self.reporter
                .report(Diag::UnmatchedParenthesis { paren: lparen });
        }
        if self.peek().kind == TokenKind::Arrow {
            let arrow = self.peek().span();
            self.skip();
            let parameters = self.flatten_comma_chain(inner);
            return Some(self.parse_arrow_tail(
                FunctionAttributes::Normal,
                parameters,
                Some(lparen.begin),
                arrow,
            ));
        }
        Some(inner)
    }

    /// Split a comma chain back into its operands (for reinterpreting a
    /// parenthesized expression as an arrow parameter list).
    fn flatten_comma_chain(&self, expression: ExprId) -> ExprList {
        match self.arena.get(expression) {
            Expr::Binary { children } => children.clone(),
            _ => smallvec![expression],
        }
    }

    /// Parse an arrow function body; the `=>` has been consumed.
    fn parse_arrow_tail(
        &mut self,
        attributes: FunctionAttributes,
        parameters: ExprList,
        parameter_list_begin: Option<u32>,
        arrow_span: Span,
    ) -> ExprId {
        if self.peek().kind == TokenKind::LeftBrace {
            self.skip();
            let mut visits = BufferingVisitor::new();
            self.parse_statements_until_right_brace(&mut visits);
            let end;
            if self.peek().kind == TokenKind::RightBrace {
                end = self.peek().end;
                self.skip();
            } else {
                end = self.lexer.end_of_previous_token();
            }
            self.arena.alloc(Expr::ArrowWithStatements {
                attributes,
                parameters,
                child_visits: visits,
                parameter_list_begin,
                end,
            })
        } else {
            let body = self.parse_assignment_or_missing(arrow_span);
            self.arena.alloc(Expr::ArrowWithExpression {
                attributes,
                parameters,
                body,
                parameter_list_begin,
            })
        }
    }

    /// Parse a `function` expression (anonymous or named); the `function`
    /// keyword is the current token. Body events are buffered inside the
    /// node.
    fn parse_function_expression(
        &mut self,
        attributes: FunctionAttributes,
        begin: u32,
    ) -> ExprId {
        self.skip(); // `function`
        let name = if self.peek().kind == TokenKind::Identifier
            || self.peek().kind.is_contextual_keyword()
        {
            let name = self.peek().identifier_name();
            self.skip();
            Some(name)
        } else {
            None
        };
        let mut visits = BufferingVisitor::new();
        match name {
            Some(name) => visits.visit_enter_named_function_scope(name),
            None => visits.visit_enter_function_scope(),
        }
        let end = self.parse_function_parameters_and_body(&mut visits);
        visits.visit_exit_function_scope();
        let span = Span::new(begin, end);
        match name {
            Some(name) => self.arena.alloc(Expr::NamedFunction {
                attributes,
                name,
                child_visits: visits,
                span,
            }),
            None => self.arena.alloc(Expr::Function {
                attributes,
                child_visits: visits,
                span,
            }),
        }
    }

    /// Parse `(params) { body }` into `v` (enter/exit scope events are the
    /// caller's job). Returns the end offset of the body's `}`.
    fn parse_function_parameters_and_body(&mut self, v: &mut dyn Visitor<'a>) -> u32 {
        if self.peek().kind == TokenKind::LeftParen {
            let lparen = self.peek().span();
            self.skip();
            loop {
                match self.peek().kind {
                    TokenKind::RightParen => {
                        self.skip();
                        break;
                    }
                    TokenKind::EndOfFile => {
                        self.reporter
                            .report(Diag::UnmatchedParenthesis { paren: lparen });
                        break;
                    }
                    TokenKind::Comma => self.skip(),
                    _ => match self.parse_assignment_opt() {
                        Some(parameter) => {
                            self.visit_binding_element(parameter, VarKind::Parameter, v);
                        }
                        None => self.skip(),
                    },
                }
            }
        }
        v.visit_enter_function_scope_body();
        if self.peek().kind == TokenKind::LeftBrace {
            self.skip();
            self.parse_statements_until_right_brace(v);
            if self.peek().kind == TokenKind::RightBrace {
                let end = self.peek().end;
                self.skip();
                return end;
            }
        }
        self.lexer.end_of_previous_token()
    }

    /// Parse a method body for an object literal entry; `begin` is the start
    /// of the property name, which is where the resulting function's span
    /// begins.
    fn parse_method_function(&mut self, attributes: FunctionAttributes, begin: u32) -> ExprId {
        let mut visits = BufferingVisitor::new();
        visits.visit_enter_function_scope();
        let end = self.parse_function_parameters_and_body(&mut visits);
        visits.visit_exit_function_scope();
        self.arena.alloc(Expr::Function {
            attributes,
            child_visits: visits,
            span: Span::new(begin, end),
        })
    }

    /// Continue a template whose head (`` `…${ ``) is the current token.
    /// Returns the substitution expressions and the end offset of the
    /// closing backtick.
    fn parse_template_rest(&mut self, template_begin: u32) -> (ExprList, u32) {
        let mut children: ExprList = smallvec![];
        loop {
            debug_assert_eq!(self.peek().kind, TokenKind::IncompleteTemplate);
            self.skip();
            let substitution = self.parse_expression_internal();
            children.push(substitution);
            self.lexer.skip_in_template(template_begin);
            match self.peek().kind {
                TokenKind::IncompleteTemplate => continue,
                TokenKind::TemplateTail => {
                    let end = self.peek().end;
                    self.skip();
                    return (children, end);
                }
                _ => {
                    // Unclosed; skip_in_template reported it.
                    return (children, self.lexer.end_of_previous_token());
                }
            }
        }
    }

    fn parse_array_literal(&mut self) -> ExprId {
        let lbracket = self.peek().span();
        self.skip();
        let mut children: ExprList = smallvec![];
        let end;
        loop {
            match self.peek().kind {
                TokenKind::RightBracket => {
                    end = self.peek().end;
                    self.skip();
                    break;
                }
                TokenKind::EndOfFile => {
                    self.reporter
                        .report(Diag::UnmatchedParenthesis { paren: lbracket });
                    end = self.lexer.end_of_previous_token();
                    break;
                }
                TokenKind::Comma => self.skip(), // elision
                _ => match self.parse_assignment_opt() {
                    Some(element) => children.push(element),
                    None => self.skip(),
                },
            }
        }
        self.arena.alloc(Expr::Array {
            children,
            span: Span::new(lbracket.begin, end),
        })
    }

    fn parse_object_literal(&mut self) -> ExprId {
        let lbrace = self.peek().span();
        self.skip();
        let mut entries: Vec<ObjectEntry> = Vec::new();
        let end;
        loop {
            match self.peek().kind {
                TokenKind::RightBrace => {
                    end = self.peek().end;
                    self.skip();
                    break;
                }
                TokenKind::EndOfFile => {
                    self.reporter
                        .report(Diag::UnmatchedParenthesis { paren: lbrace });
                    end = self.lexer.end_of_previous_token();
                    break;
                }
                TokenKind::Comma => {
                    self.skip();
                    continue;
                }
                _ => self.parse_object_entry(&mut entries),
            }
            // Entry separator.
            match self.peek().kind {
                TokenKind::Comma => self.skip(),
                TokenKind::RightBrace | TokenKind::EndOfFile => {}
                _ => {
                    self.reporter
                        .report(Diag::MissingCommaBetweenObjectLiteralEntries {
                            position: Span::empty_at(self.lexer.end_of_previous_token()),
                        });
                }
            }
        }
        self.arena.alloc(Expr::Object {
            entries,
            span: Span::new(lbrace.begin, end),
        })
    }

    fn parse_object_entry(&mut self, entries: &mut Vec<ObjectEntry>) {
        let token = *self.peek();
        match token.kind {
            TokenKind::DotDotDot => {
                // Spread entry.
                let spread_span = token.span();
                let value = match self.parse_assignment_opt() {
                    Some(value) => value,
                    None => self.missing_operand(spread_span),
                };
                entries.push(ObjectEntry {
                    property: None,
                    value,
                });
            }
            TokenKind::Get | TokenKind::Set | TokenKind::Async => {
                self.skip();
                match self.peek().kind {
                    TokenKind::Colon
                    | TokenKind::LeftParen
                    | TokenKind::Comma
                    | TokenKind::RightBrace
                    | TokenKind::Equal
                    | TokenKind::EndOfFile => {
                        // `get` used as an ordinary key.
                        self.parse_object_entry_after_key(token, entries);
                    }
                    _ => {
                        // Accessor or async method: a property name follows.
                        let attributes = if token.kind == TokenKind::Async {
                            FunctionAttributes::Async
                        } else {
                            FunctionAttributes::Normal
                        };
                        if let Some((property, name_begin)) = self.parse_property_name() {
                            let method = self.parse_method_function(attributes, name_begin);
                            entries.push(ObjectEntry {
                                property,
                                value: method,
                            });
                        }
                    }
                }
            }
            TokenKind::Identifier | TokenKind::String | TokenKind::Number => {
                self.skip();
                self.parse_object_entry_after_key(token, entries);
            }
            kind if kind.is_keyword() => {
                self.skip();
                self.parse_object_entry_after_key(token, entries);
            }
            TokenKind::LeftBracket => {
                self.skip();
                let key = self.parse_expression_internal();
                if self.peek().kind == TokenKind::RightBracket {
                    self.skip();
                } else {
                    self.reporter.report(Diag::UnmatchedParenthesis {
                        paren: token.span(),
                    });
                }
                self.parse_object_entry_after_computed_key(key, token.begin, entries);
            }
            _ => {
                // Not a recognizable entry; make progress.
                self.skip();
            }
        }
    }

    /// Finish an entry whose non-computed key token has been consumed.
    fn parse_object_entry_after_key(
        &mut self,
        key_token: Token<'a>,
        entries: &mut Vec<ObjectEntry>,
    ) {
        let key = self.arena.alloc(Expr::Literal {
            span: key_token.span(),
        });
        match self.peek().kind {
            TokenKind::Colon => {
                let colon = self.peek().span();
                self.skip();
                let value = self.parse_assignment_or_missing(colon);
                entries.push(ObjectEntry {
                    property: Some(key),
                    value,
                });
            }
            TokenKind::LeftParen => {
                let method =
                    self.parse_method_function(FunctionAttributes::Normal, key_token.begin);
                entries.push(ObjectEntry {
                    property: Some(key),
                    value: method,
                });
            }
            TokenKind::Equal => {
                // `{key = value}` — destructuring default.
                let equal = self.peek().span();
                self.skip();
                let rhs = self.parse_assignment_or_missing(equal);
                let lhs = self.arena.alloc(Expr::Variable {
                    name: key_token.identifier_name(),
                });
                let value = self.arena.alloc(Expr::Assignment { lhs, rhs });
                entries.push(ObjectEntry {
                    property: Some(key),
                    value,
                });
            }
            _ => {
                // Shorthand `{key}`.
                let value = self.arena.alloc(Expr::Variable {
                    name: key_token.identifier_name(),
                });
                entries.push(ObjectEntry {
                    property: Some(key),
                    value,
                });
            }
        }
    }

    fn parse_object_entry_after_computed_key(
        &mut self,
        key: ExprId,
        key_begin: u32,
        entries: &mut Vec<ObjectEntry>,
    ) {
        match self.peek().kind {
            TokenKind::Colon => {
                let colon = self.peek().span();
                self.skip();
                let value = self.parse_assignment_or_missing(colon);
                entries.push(ObjectEntry {
                    property: Some(key),
                    value,
                });
            }
            TokenKind::LeftParen => {
                let method = self.parse_method_function(FunctionAttributes::Normal, key_begin);
                entries.push(ObjectEntry {
                    property: Some(key),
                    value: method,
                });
            }
            _ => {
                entries.push(ObjectEntry {
                    property: Some(key),
                    value: key,
                });
            }
        }
    }

    /// Parse a property name for an accessor or async method. Returns the
    /// key expression and the begin offset of the name.
    fn parse_property_name(&mut self) -> Option<(Option<ExprId>, u32)> {
        let token = *self.peek();
        match token.kind {
            TokenKind::Identifier | TokenKind::String | TokenKind::Number => {
                self.skip();
                let key = self.arena.alloc(Expr::Literal {
                    span: token.span(),
                });
                Some((Some(key), token.begin))
            }
            kind if kind.is_keyword() => {
                self.skip();
                let key = self.arena.alloc(Expr::Literal {
                    span: token.span(),
                });
                Some((Some(key), token.begin))
            }
            TokenKind::LeftBracket => {
                self.skip();
                let key = self.parse_expression_internal();
                if self.peek().kind == TokenKind::RightBracket {
                    self.skip();
                } else {
                    self.reporter.report(Diag::UnmatchedParenthesis {
                        paren: token.span(),
                    });
                }
                Some((Some(key), token.begin))
            }
            _ => None,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Helpers
    // ────────────────────────────────────────────────────────────────────────

    fn peek(&self) -> &Token<'a> {
        self.lexer.peek()
    }

    fn skip(&mut self) {
        self.lexer.skip();
    }

    fn make_invalid(&mut self, span: Span) -> ExprId {
        self.arena.alloc(Expr::Invalid { span })
    }

    fn missing_operand(&mut self, operator: Span) -> ExprId {
        self.reporter
            .report(Diag::MissingOperandForOperator { operator });
        self.make_invalid(operator)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::DiagCollector;
    use crate::parser::visit::VisitEvent;

    struct TestParser {
        diags: &'static DiagCollector,
        parser: Parser<'static>,
    }

    impl TestParser {
        fn new(src: &str) -> Self {
            // Leak the buffers so the parser can be 'static; fine for tests.
            let source: &'static PaddedString = Box::leak(Box::new(PaddedString::new(src)));
            let zone: &'static Zone = Box::leak(Box::new(Zone::new()));
            let diags: &'static DiagCollector = Box::leak(Box::new(DiagCollector::new()));
            Self {
                diags,
                parser: Parser::new(source, zone, diags),
            }
        }

        fn parse_expression(&mut self) -> ExprId {
            self.parser.parse_expression()
        }

        fn summarize(&self, id: ExprId) -> String {
            summarize(self.parser.arena(), id)
        }

        fn errors(&self) -> Vec<Diag> {
            self.diags.diags()
        }

        fn span(&self, id: ExprId) -> Span {
            self.parser.arena().span(id)
        }
    }

    /// Compact structural rendering of an expression, used the way a
    /// pretty-printed AST dump would be.
    fn summarize(arena: &ExprArena<'_>, id: ExprId) -> String {
        fn list(arena: &ExprArena<'_>, ids: &[ExprId]) -> String {
            ids.iter()
                .map(|id| summarize(arena, *id))
                .collect::<Vec<_>>()
                .join(", ")
        }
        let attributes_prefix = |attributes: &FunctionAttributes| match attributes {
            FunctionAttributes::Normal => "",
            FunctionAttributes::Async => "async",
        };
        match arena.get(id) {
            Expr::Invalid { .. } => "?".to_owned(),
            Expr::Literal { .. } => "literal".to_owned(),
            Expr::Variable { name } => format!("var {}", name.name),
            Expr::Dot { object, property } => {
                format!("dot({}, {})", summarize(arena, *object), property.name)
            }
            Expr::Index {
                object, subscript, ..
            } => format!(
                "index({}, {})",
                summarize(arena, *object),
                summarize(arena, *subscript)
            ),
            Expr::Call { children, .. } => format!("call({})", list(arena, children)),
            Expr::New { children, .. } => format!("new({})", list(arena, children)),
            Expr::Unary { child, .. } => format!("unary({})", summarize(arena, *child)),
            Expr::RwUnaryPrefix { child, .. } => {
                format!("rwunary({})", summarize(arena, *child))
            }
            Expr::RwUnarySuffix { child, .. } => {
                format!("rwunarysuffix({})", summarize(arena, *child))
            }
            Expr::Typeof { child, .. } => format!("typeof({})", summarize(arena, *child)),
            Expr::Await { child, .. } => format!("await({})", summarize(arena, *child)),
            Expr::Spread { child, .. } => format!("spread({})", summarize(arena, *child)),
            Expr::Binary { children } => format!("binary({})", list(arena, children)),
            Expr::Conditional {
                condition,
                true_branch,
                false_branch,
            } => format!(
                "cond({}, {}, {})",
                summarize(arena, *condition),
                summarize(arena, *true_branch),
                summarize(arena, *false_branch)
            ),
            Expr::Assignment { lhs, rhs } => format!(
                "assign({}, {})",
                summarize(arena, *lhs),
                summarize(arena, *rhs)
            ),
            Expr::CompoundAssignment { lhs, rhs } => format!(
                "upassign({}, {})",
                summarize(arena, *lhs),
                summarize(arena, *rhs)
            ),
            Expr::Array { children, .. } => format!("array({})", list(arena, children)),
            Expr::Object { entries, .. } => {
                let mut parts = Vec::new();
                for entry in entries {
                    parts.push(match entry.property {
                        Some(property) => summarize(arena, property),
                        None => "(null)".to_owned(),
                    });
                    parts.push(summarize(arena, entry.value));
                }
                format!("object({})", parts.join(", "))
            }
            Expr::Template { children, .. } => format!("template({})", list(arena, children)),
            Expr::TaggedTemplate { children, .. } => {
                format!("taggedtemplate({})", list(arena, children))
            }
            Expr::Function { .. } => "function".to_owned(),
            Expr::NamedFunction { name, .. } => format!("function {}", name.name),
            Expr::ArrowWithExpression {
                attributes,
                parameters,
                body,
                ..
            } => {
                let mut children: Vec<ExprId> = parameters.to_vec();
                children.push(*body);
                format!(
                    "{}arrowexpr({})",
                    attributes_prefix(attributes),
                    list(arena, &children)
                )
            }
            Expr::ArrowWithStatements {
                attributes,
                parameters,
                ..
            } => format!(
                "{}arrowblock({})",
                attributes_prefix(attributes),
                list(arena, parameters)
            ),
            Expr::Import { .. } => "import".to_owned(),
            Expr::NewTarget { .. } => "newtarget".to_owned(),
            Expr::Super { .. } => "super".to_owned(),
        }
    }

    /// Parse `src` as an expression, assert no diagnostics, and summarize.
    fn parse_and_summarize(src: &str) -> String {
        let mut p = TestParser::new(src);
        let ast = p.parse_expression();
        assert!(p.errors().is_empty(), "{src}: {:?}", p.errors());
        p.summarize(ast)
    }

    /// Parse `src` as a module and return simplified visit-event strings plus
    /// diagnostics.
    fn module_events(src: &str) -> (Vec<String>, Vec<Diag>) {
        let mut p = TestParser::new(src);
        let mut recorder = BufferingVisitor::new();
        p.parser.parse_and_visit_module(&mut recorder);
        let events = recorder
            .events()
            .iter()
            .map(|event| match event {
                VisitEvent::EnterBlockScope => "enter_block_scope".to_owned(),
                VisitEvent::EnterClassScope => "enter_class_scope".to_owned(),
                VisitEvent::EnterForScope => "enter_for_scope".to_owned(),
                VisitEvent::EnterFunctionScope => "enter_function_scope".to_owned(),
                VisitEvent::EnterFunctionScopeBody => "enter_function_scope_body".to_owned(),
                VisitEvent::EnterNamedFunctionScope(name) => {
                    format!("enter_named_function_scope {}", name.name)
                }
                VisitEvent::ExitBlockScope => "exit_block_scope".to_owned(),
                VisitEvent::ExitClassScope => "exit_class_scope".to_owned(),
                VisitEvent::ExitForScope => "exit_for_scope".to_owned(),
                VisitEvent::ExitFunctionScope => "exit_function_scope".to_owned(),
                VisitEvent::PropertyDeclaration(name) => format!("property {}", name.name),
                VisitEvent::VariableDeclaration(name, kind) => {
                    format!("declare {} {}", kind, name.name)
                }
                VisitEvent::VariableAssignment(name) => format!("assign {}", name.name),
                VisitEvent::VariableTypeofUse(name) => format!("typeof {}", name.name),
                VisitEvent::VariableUse(name) => format!("use {}", name.name),
                VisitEvent::EndOfModule => "end_of_module".to_owned(),
            })
            .collect();
        (events, p.errors())
    }

    // ── Single-token expressions ────────────────────────────────────────────

    #[test]
    fn test_parse_single_token_expression() {
        let mut p = TestParser::new("x");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "var x");
        assert!(p.errors().is_empty());
        assert_eq!(p.span(ast), Span::new(0, 1));

        let mut p = TestParser::new("42");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "literal");
        assert_eq!(p.span(ast), Span::new(0, 2));

        let mut p = TestParser::new("'hello'");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "literal");
        assert_eq!(p.span(ast), Span::new(0, 7));

        for src in ["null", "true", "false", "this"] {
            let mut p = TestParser::new(src);
            let ast = p.parse_expression();
            assert_eq!(p.summarize(ast), "literal", "{src}");
            assert_eq!(p.span(ast), Span::new(0, src.len() as u32), "{src}");
            assert!(p.errors().is_empty(), "{src}");
        }
    }

    #[test]
    fn test_parse_regular_expression() {
        let mut p = TestParser::new("/regexp/");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "literal");
        assert_eq!(p.span(ast), Span::new(0, 8));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("/=regexp/");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "literal");
        assert_eq!(p.span(ast), Span::new(0, 9));
        assert!(p.errors().is_empty());
    }

    // ── Arithmetic and logical operators ────────────────────────────────────

    #[test]
    fn test_parse_math_expression() {
        let mut p = TestParser::new("-x");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "unary(var x)");
        assert_eq!(p.span(ast), Span::new(0, 2));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("+x"), "unary(var x)");
        assert_eq!(parse_and_summarize("~x"), "unary(var x)");

        let mut p = TestParser::new("x+y");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(var x, var y)");
        assert_eq!(p.span(ast), Span::new(0, 3));

        assert_eq!(parse_and_summarize("x+y-z"), "binary(var x, var y, var z)");
        assert_eq!(
            parse_and_summarize("2-4+1"),
            "binary(literal, literal, literal)"
        );
        assert_eq!(parse_and_summarize("-x+y"), "binary(unary(var x), var y)");

        for src in [
            "2+2", "2-2", "2*2", "2/2", "2%2", "2**2", "2^2", "2&2", "2|2", "2<<2", "2>>2",
            "2>>>2",
        ] {
            assert_eq!(parse_and_summarize(src), "binary(literal, literal)", "{src}");
        }
    }

    #[test]
    fn test_binary_flattening_respects_precedence() {
        assert_eq!(
            parse_and_summarize("x+y*z"),
            "binary(var x, binary(var y, var z))"
        );
        assert_eq!(
            parse_and_summarize("a*b*c+d"),
            "binary(binary(var a, var b, var c), var d)"
        );
    }

    #[test]
    fn test_parse_broken_math_expression() {
        let mut p = TestParser::new("2+");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(literal, ?)");
        assert_eq!(
            p.errors(),
            vec![Diag::MissingOperandForOperator {
                operator: Span::new(1, 2)
            }]
        );

        let mut p = TestParser::new("^2");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(?, literal)");
        assert_eq!(
            p.errors(),
            vec![Diag::MissingOperandForOperator {
                operator: Span::new(0, 1)
            }]
        );

        let mut p = TestParser::new("2 * * 2");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(literal, ?, literal)");
        assert_eq!(
            p.errors(),
            vec![Diag::MissingOperandForOperator {
                operator: Span::new(2, 3)
            }]
        );

        let mut p = TestParser::new("2 & & & 2");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(literal, ?, ?, literal)");
        assert_eq!(
            p.errors(),
            vec![
                Diag::MissingOperandForOperator {
                    operator: Span::new(2, 3)
                },
                Diag::MissingOperandForOperator {
                    operator: Span::new(4, 5)
                },
            ]
        );

        let mut p = TestParser::new("(2*)");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(literal, ?)");
        assert_eq!(
            p.errors(),
            vec![Diag::MissingOperandForOperator {
                operator: Span::new(2, 3)
            }]
        );

        let mut p = TestParser::new("2 * (3 + 4");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(literal, binary(literal, literal))");
        assert_eq!(
            p.errors(),
            vec![Diag::UnmatchedParenthesis {
                paren: Span::new(4, 5)
            }]
        );

        let mut p = TestParser::new("2 * (3 + (4");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(literal, binary(literal, literal))");
        assert_eq!(
            p.errors(),
            vec![
                Diag::UnmatchedParenthesis {
                    paren: Span::new(9, 10)
                },
                Diag::UnmatchedParenthesis {
                    paren: Span::new(4, 5)
                },
            ]
        );
    }

    #[test]
    fn test_parse_logical_expression() {
        for src in [
            "2==2", "2===2", "2!=2", "2!==2", "2>2", "2<2", "2>=2", "2<=2", "2&&2", "2||2",
            "2??2",
        ] {
            assert_eq!(parse_and_summarize(src), "binary(literal, literal)", "{src}");
        }
        assert_eq!(parse_and_summarize("!x"), "unary(var x)");
    }

    #[test]
    fn test_parse_keyword_binary_operators() {
        assert_eq!(
            parse_and_summarize("prop in object"),
            "binary(var prop, var object)"
        );
        assert_eq!(
            parse_and_summarize("object instanceof Class"),
            "binary(var object, var Class)"
        );
    }

    #[test]
    fn test_parse_typeof_unary_operator() {
        assert_eq!(parse_and_summarize("typeof o"), "typeof(var o)");
        assert_eq!(
            parse_and_summarize("typeof o === 'number'"),
            "binary(typeof(var o), literal)"
        );
        assert_eq!(parse_and_summarize("typeof o.p"), "typeof(dot(var o, p))");
    }

    #[test]
    fn test_delete_unary_operator() {
        assert_eq!(parse_and_summarize("delete variable"), "unary(var variable)");
        assert_eq!(
            parse_and_summarize("delete variable.property"),
            "unary(dot(var variable, property))"
        );
    }

    #[test]
    fn test_void_unary_operator() {
        assert_eq!(parse_and_summarize("void 0"), "unary(literal)");
    }

    #[test]
    fn test_spread() {
        let mut p = TestParser::new("...args");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "spread(var args)");
        assert_eq!(p.span(ast), Span::new(0, 7));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_conditional_expression() {
        let mut p = TestParser::new("x?y:z");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "cond(var x, var y, var z)");
        assert_eq!(p.span(ast), Span::new(0, 5));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("x+x?y+y:z+z"),
            "cond(binary(var x, var x), binary(var y, var y), binary(var z, var z))"
        );
        assert_eq!(
            parse_and_summarize("a ? b : c ? d : e"),
            "cond(var a, var b, cond(var c, var d, var e))"
        );
    }

    // ── Member access and calls ─────────────────────────────────────────────

    #[test]
    fn test_parse_function_call() {
        let mut p = TestParser::new("f()");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "call(var f)");
        assert_eq!(p.span(ast), Span::new(0, 3));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("f(x)"), "call(var f, var x)");
        assert_eq!(parse_and_summarize("f(x,y)"), "call(var f, var x, var y)");
    }

    #[test]
    fn test_parse_dot_expressions() {
        let mut p = TestParser::new("x.prop");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "dot(var x, prop)");
        assert_eq!(p.span(ast), Span::new(0, 6));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("x.p1.p2"), "dot(dot(var x, p1), p2)");

        for keyword in ["catch", "class", "default", "get", "try"] {
            let src = format!("promise.{keyword}");
            let mut p = TestParser::new(&src);
            let ast = p.parse_expression();
            assert_eq!(p.summarize(ast), format!("dot(var promise, {keyword})"));
            assert!(p.errors().is_empty(), "{src}");
        }
    }

    #[test]
    fn test_optional_chaining() {
        assert_eq!(parse_and_summarize("x?.y"), "dot(var x, y)");
        assert_eq!(parse_and_summarize("f?.(x)"), "call(var f, var x)");
        assert_eq!(parse_and_summarize("xs?.[i]"), "index(var xs, var i)");
    }

    #[test]
    fn test_parse_indexing_expression() {
        let mut p = TestParser::new("xs[i]");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "index(var xs, var i)");
        assert_eq!(p.span(ast), Span::new(0, 5));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_parse_parenthesized_expression() {
        let mut p = TestParser::new("(x)");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "var x");
        assert_eq!(p.span(ast), Span::new(1, 2));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("x+(y)"), "binary(var x, var y)");
        assert_eq!(
            parse_and_summarize("x+(y+z)"),
            "binary(var x, binary(var y, var z))"
        );
        assert_eq!(
            parse_and_summarize("(x+y)+z"),
            "binary(binary(var x, var y), var z)"
        );
        assert_eq!(
            parse_and_summarize("x+(y+z)+w"),
            "binary(var x, binary(var y, var z), var w)"
        );
    }

    #[test]
    fn test_parse_await_expression() {
        let mut p = TestParser::new("await myPromise");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "await(var myPromise)");
        assert_eq!(p.span(ast), Span::new(0, 15));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_parse_new_expression() {
        let mut p = TestParser::new("new Date");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "new(var Date)");
        assert_eq!(p.span(ast), Span::new(0, 8));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("new Date()");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "new(var Date)");
        assert_eq!(p.span(ast), Span::new(0, 10));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("new Date(y,m,d)"),
            "new(var Date, var y, var m, var d)"
        );
    }

    #[test]
    fn test_new_target() {
        let mut p = TestParser::new("new.target");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "newtarget");
        assert_eq!(p.span(ast), Span::new(0, 10));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("new.target()"), "call(newtarget)");
    }

    #[test]
    fn test_super() {
        assert_eq!(parse_and_summarize("super()"), "call(super)");
        assert_eq!(
            parse_and_summarize("super.method()"),
            "call(dot(super, method))"
        );
    }

    #[test]
    fn test_import() {
        assert_eq!(parse_and_summarize("import(url)"), "call(import, var url)");
        assert_eq!(parse_and_summarize("import.meta"), "dot(import, meta)");
    }

    // ── Assignment ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_assignment() {
        let mut p = TestParser::new("x=y");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "assign(var x, var y)");
        assert_eq!(p.span(ast), Span::new(0, 3));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("x.p=z"), "assign(dot(var x, p), var z)");
        assert_eq!(
            parse_and_summarize("f().p=x"),
            "assign(dot(call(var f), p), var x)"
        );
        assert_eq!(
            parse_and_summarize("x=y=z"),
            "assign(var x, assign(var y, var z))"
        );
        assert_eq!(
            parse_and_summarize("x,y=z,w"),
            "binary(var x, assign(var y, var z), var w)"
        );
    }

    #[test]
    fn test_parse_compound_assignment() {
        for op in [
            "*=", "/=", "%=", "+=", "-=", "<<=", ">>=", ">>>=", "&=", "^=", "|=", "**=",
        ] {
            let src = format!("x {op} y");
            let mut p = TestParser::new(&src);
            let ast = p.parse_expression();
            assert_eq!(p.summarize(ast), "upassign(var x, var y)", "{src}");
            assert_eq!(p.span(ast), Span::new(0, src.len() as u32), "{src}");
            assert!(p.errors().is_empty(), "{src}");
        }
    }

    #[test]
    fn test_parse_invalid_assignment() {
        let mut p = TestParser::new("x+y=z");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "assign(binary(var x, var y), var z)");
        assert_eq!(
            p.errors(),
            vec![Diag::InvalidExpressionLeftOfAssignment {
                expression: Span::new(0, 3)
            }]
        );

        for src in ["f()=x", "-x=y", "42=y", "(x=y)=z"] {
            let mut p = TestParser::new(src);
            p.parse_expression();
            assert!(
                p.errors()
                    .iter()
                    .any(|d| matches!(d, Diag::InvalidExpressionLeftOfAssignment { .. })),
                "{src}: {:?}",
                p.errors()
            );
        }
    }

    // ── Increment / decrement ───────────────────────────────────────────────

    #[test]
    fn test_parse_prefix_plusplus_minusminus() {
        let mut p = TestParser::new("++x");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "rwunary(var x)");
        assert_eq!(p.span(ast), Span::new(0, 3));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("--y");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "rwunary(var y)");
        assert_eq!(p.span(ast), Span::new(0, 3));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_parse_suffix_plusplus_minusminus() {
        let mut p = TestParser::new("x++");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "rwunarysuffix(var x)");
        assert_eq!(p.span(ast), Span::new(0, 3));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_suffix_plusplus_minusminus_disallows_line_break() {
        let mut p = TestParser::new("x\n++\ny");

        let ast_1 = p.parse_expression();
        assert_eq!(p.summarize(ast_1), "var x");

        // ASI: a semicolon must have been inserted before the `++`.
        assert_eq!(p.parser.lexer().peek().kind, TokenKind::Semicolon);
        p.parser.lexer().skip();

        let ast_2 = p.parse_expression();
        assert_eq!(p.summarize(ast_2), "rwunary(var y)");
        assert!(p.errors().is_empty());
    }

    // ── Templates ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_template() {
        let mut p = TestParser::new("`hello`");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "literal");
        assert_eq!(p.span(ast), Span::new(0, 7));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("`hello${world}`");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "template(var world)");
        assert_eq!(p.span(ast), Span::new(0, 15));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("`${one}${two}${three}`"),
            "template(var one, var two, var three)"
        );
    }

    #[test]
    fn test_tagged_template_literal() {
        let mut p = TestParser::new("hello`world`");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "taggedtemplate(var hello)");
        assert_eq!(p.span(ast), Span::new(0, 12));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("hello`template ${literal} thingy`");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "taggedtemplate(var hello, var literal)");
        assert_eq!(p.span(ast), Span::new(0, 33));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("a.b()`c`"),
            "taggedtemplate(call(dot(var a, b)))"
        );
        assert_eq!(
            parse_and_summarize("tag`template`.property"),
            "dot(taggedtemplate(var tag), property)"
        );
        assert_eq!(
            parse_and_summarize("x + tag`template`"),
            "binary(var x, taggedtemplate(var tag))"
        );
    }

    // ── Array and object literals ───────────────────────────────────────────

    #[test]
    fn test_array_literal() {
        let mut p = TestParser::new("[]");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "array()");
        assert_eq!(p.span(ast), Span::new(0, 2));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("[x]"), "array(var x)");
        assert_eq!(parse_and_summarize("[x, y]"), "array(var x, var y)");
        assert_eq!(parse_and_summarize("[,,x,,y,,]"), "array(var x, var y)");
    }

    #[test]
    fn test_object_literal() {
        let mut p = TestParser::new("{}");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object()");
        assert_eq!(p.span(ast), Span::new(0, 2));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("{key: value}"),
            "object(literal, var value)"
        );
        assert_eq!(
            parse_and_summarize("{key1: value1, key2: value2}"),
            "object(literal, var value1, literal, var value2)"
        );
        assert_eq!(
            parse_and_summarize("{'key': value}"),
            "object(literal, var value)"
        );
        assert_eq!(
            parse_and_summarize("{[key]: value}"),
            "object(var key, var value)"
        );
        assert_eq!(
            parse_and_summarize("{key1: value1, thing2, key3: value3}"),
            "object(literal, var value1, literal, var thing2, literal, var value3)"
        );
        assert_eq!(
            parse_and_summarize("{key: variable = value}"),
            "object(literal, assign(var variable, var value))"
        );
        assert_eq!(
            parse_and_summarize("{key = value}"),
            "object(literal, assign(var key, var value))"
        );
        assert_eq!(
            parse_and_summarize("{...other, k: v}"),
            "object((null), spread(var other), literal, var v)"
        );
    }

    #[test]
    fn test_object_literal_shorthand_spans() {
        let mut p = TestParser::new("{thing}");
        let ast = p.parse_expression();
        assert!(p.errors().is_empty());
        let (property, value) = match p.parser.arena().get(ast) {
            Expr::Object { entries, .. } => (entries[0].property.unwrap(), entries[0].value),
            other => panic!("expected object, got {other:?}"),
        };
        assert_eq!(p.span(property), Span::new(1, 6));
        assert_eq!(p.span(value), Span::new(1, 6));
    }

    #[test]
    fn test_object_literal_with_method_key() {
        let mut p = TestParser::new("{ func(a, b) { } }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object(literal, function)");
        let value = match p.parser.arena().get(ast) {
            Expr::Object { entries, .. } => entries[0].value,
            other => panic!("expected object, got {other:?}"),
        };
        assert_eq!(p.span(value), Span::new(2, 16));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("{ 'func'(a, b) { } }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object(literal, function)");
        let value = match p.parser.arena().get(ast) {
            Expr::Object { entries, .. } => entries[0].value,
            other => panic!("expected object, got {other:?}"),
        };
        assert_eq!(p.span(value), Span::new(2, 18));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("{ [func](a, b) { } }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object(var func, function)");
        let value = match p.parser.arena().get(ast) {
            Expr::Object { entries, .. } => entries[0].value,
            other => panic!("expected object, got {other:?}"),
        };
        assert_eq!(p.span(value), Span::new(2, 18));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_object_literal_with_getter_setter_key() {
        let mut p = TestParser::new("{ get prop() { } }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object(literal, function)");
        let value = match p.parser.arena().get(ast) {
            Expr::Object { entries, .. } => entries[0].value,
            other => panic!("expected object, got {other:?}"),
        };
        // The method span begins at the property name, not at `get`.
        assert_eq!(p.span(value), Span::new(6, 16));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("{ set prop(v) { } }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object(literal, function)");
        let value = match p.parser.arena().get(ast) {
            Expr::Object { entries, .. } => entries[0].value,
            other => panic!("expected object, got {other:?}"),
        };
        assert_eq!(p.span(value), Span::new(6, 17));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("{get 1234() { }}"),
            "object(literal, function)"
        );
        assert_eq!(
            parse_and_summarize("{get 'string key'() { }}"),
            "object(literal, function)"
        );
        assert_eq!(
            parse_and_summarize("{get [expression + key]() { }}"),
            "object(binary(var expression, var key), function)"
        );
    }

    #[test]
    fn test_object_literal_with_keyword_key() {
        for keyword in ["catch", "class", "default", "get", "set", "try"] {
            let src = format!("{{{keyword}: null}}");
            assert_eq!(parse_and_summarize(&src), "object(literal, literal)", "{src}");

            let src = format!("{{get {keyword}() {{}}}}");
            assert_eq!(parse_and_summarize(&src), "object(literal, function)", "{src}");

            let src = format!("{{{keyword}() {{}}}}");
            assert_eq!(parse_and_summarize(&src), "object(literal, function)", "{src}");
        }
    }

    #[test]
    fn test_object_literal_with_number_key() {
        assert_eq!(parse_and_summarize("{1234: null}"), "object(literal, literal)");
    }

    #[test]
    fn test_malformed_object_literal() {
        let mut p = TestParser::new("{p1: v1 p2}");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "object(literal, var v1, literal, var p2)");
        assert_eq!(
            p.errors(),
            vec![Diag::MissingCommaBetweenObjectLiteralEntries {
                position: Span::new(7, 7)
            }]
        );
    }

    // ── Comma chains ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_comma_expression() {
        let mut p = TestParser::new("x,y,z");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "binary(var x, var y, var z)");
        assert_eq!(p.span(ast), Span::new(0, 5));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("(x+(y,z)+w)"),
            "binary(var x, binary(var y, var z), var w)"
        );
        assert_eq!(
            parse_and_summarize("`${2+2, four}`"),
            "template(binary(binary(literal, literal), var four))"
        );
        assert_eq!(
            parse_and_summarize("i = 0, j = 0"),
            "binary(assign(var i, literal), assign(var j, literal))"
        );
    }

    // ── Function expressions ────────────────────────────────────────────────

    #[test]
    fn test_parse_function_expression() {
        let mut p = TestParser::new("function(){} /* */");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "function");
        assert_eq!(p.span(ast), Span::new(0, 12));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("function(x, y){}"), "function");
        assert_eq!(parse_and_summarize("function(){}()"), "call(function)");
        assert_eq!(parse_and_summarize("function f(){}"), "function f");
    }

    #[test]
    fn test_function_with_destructuring_parameters() {
        assert_eq!(parse_and_summarize("function({a, b}) { c }"), "function");
        assert_eq!(parse_and_summarize("function([a, b]) { c }"), "function");
    }

    #[test]
    fn test_async_function_expression() {
        let mut p = TestParser::new("async function(){}");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "function");
        assert!(matches!(
            p.parser.arena().get(ast),
            Expr::Function {
                attributes: FunctionAttributes::Async,
                ..
            }
        ));
        assert_eq!(p.span(ast), Span::new(0, 18));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("async function f(){}");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "function f");
        assert!(matches!(
            p.parser.arena().get(ast),
            Expr::NamedFunction {
                attributes: FunctionAttributes::Async,
                ..
            }
        ));
        assert_eq!(p.span(ast), Span::new(0, 20));
        assert!(p.errors().is_empty());
    }

    // ── Arrow functions ─────────────────────────────────────────────────────

    #[test]
    fn test_arrow_function_with_expression() {
        let mut p = TestParser::new("() => a");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "arrowexpr(var a)");
        assert_eq!(p.span(ast), Span::new(0, 7));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("a => b");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "arrowexpr(var a, var b)");
        assert_eq!(p.span(ast), Span::new(0, 6));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("(a) => b");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "arrowexpr(var a, var b)");
        assert_eq!(p.span(ast), Span::new(0, 8));
        assert!(p.errors().is_empty());

        assert_eq!(
            parse_and_summarize("(a, b) => c"),
            "arrowexpr(var a, var b, var c)"
        );
        assert_eq!(
            parse_and_summarize("() => a, b"),
            "binary(arrowexpr(var a), var b)"
        );
        assert_eq!(
            parse_and_summarize("a => b, c"),
            "binary(arrowexpr(var a, var b), var c)"
        );
    }

    #[test]
    fn test_arrow_function_with_statements() {
        let mut p = TestParser::new("() => { a; }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "arrowblock()");
        assert_eq!(p.span(ast), Span::new(0, 12));
        assert!(p.errors().is_empty());

        let mut p = TestParser::new("a => { b; } /* */");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "arrowblock(var a)");
        assert_eq!(p.span(ast), Span::new(0, 11));
        assert!(p.errors().is_empty());
    }

    #[test]
    fn test_arrow_function_with_destructuring_parameters() {
        assert_eq!(
            parse_and_summarize("({a, b}) => c"),
            "arrowexpr(object(literal, var a, literal, var b), var c)"
        );
        assert_eq!(
            parse_and_summarize("([a, b]) => c"),
            "arrowexpr(array(var a, var b), var c)"
        );
    }

    #[test]
    fn test_async_arrow_function() {
        let mut p = TestParser::new("async () => { a; }");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "asyncarrowblock()");
        assert_eq!(p.span(ast), Span::new(0, 18));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("async x => { y; }"), "asyncarrowblock(var x)");
        assert_eq!(
            parse_and_summarize("async (x, y, z) => { w; }"),
            "asyncarrowblock(var x, var y, var z)"
        );

        let mut p = TestParser::new("async () => a");
        let ast = p.parse_expression();
        assert_eq!(p.summarize(ast), "asyncarrowexpr(var a)");
        assert_eq!(p.span(ast), Span::new(0, 13));
        assert!(p.errors().is_empty());

        assert_eq!(parse_and_summarize("async x => y"), "asyncarrowexpr(var x, var y)");
        assert_eq!(
            parse_and_summarize("async (x, y, z) => w"),
            "asyncarrowexpr(var x, var y, var z, var w)"
        );
    }

    // ── Mixed expressions ───────────────────────────────────────────────────

    #[test]
    fn test_parse_mixed_expression() {
        assert_eq!(parse_and_summarize("a+f()"), "binary(var a, call(var f))");
        assert_eq!(
            parse_and_summarize("a+f(x+y,-z-w)+b"),
            "binary(var a, call(var f, binary(var x, var y), binary(unary(var z), var w)), var b)"
        );
        assert_eq!(parse_and_summarize("(x+y).z"), "dot(binary(var x, var y), z)");
        assert_eq!(
            parse_and_summarize("/hello/.test(string)"),
            "call(dot(literal, test), var string)"
        );
        assert_eq!(
            parse_and_summarize("!/hello/.test(string)"),
            "unary(call(dot(literal, test), var string))"
        );
        assert_eq!(
            parse_and_summarize("{a: new A(), b: new B()}"),
            "object(literal, new(var A), literal, new(var B))"
        );
        assert_eq!(
            parse_and_summarize("!!o && k in o"),
            "binary(unary(unary(var o)), binary(var k, var o))"
        );
        assert_eq!(
            parse_and_summarize("x --> 0"),
            "binary(rwunarysuffix(var x), literal)"
        );
    }

    // ── Statements and visit events ─────────────────────────────────────────

    #[test]
    fn test_let_statement_events() {
        let (events, diags) = module_events("let x = 1;");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(events, ["declare let x", "end_of_module"]);

        let (events, diags) = module_events("let x = y;");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(events, ["use y", "declare let x", "end_of_module"]);

        let (events, _) = module_events("var a; const b = 0;");
        assert_eq!(events, ["declare var a", "declare const b", "end_of_module"]);
    }

    #[test]
    fn test_let_destructuring_events() {
        let (events, diags) = module_events("let [a, b] = xs;");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            ["use xs", "declare let a", "declare let b", "end_of_module"]
        );

        let (events, diags) = module_events("let {k, v = d} = o;");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            ["use o", "declare let k", "use d", "declare let v", "end_of_module"]
        );
    }

    #[test]
    fn test_let_statement_diagnostics() {
        let (_, diags) = module_events("let;");
        assert_eq!(
            diags,
            vec![Diag::LetWithNoBindings {
                statement: Span::new(0, 3)
            }]
        );

        let (events, diags) = module_events("let ,x;");
        assert_eq!(
            diags,
            vec![Diag::StrayCommaInLetStatement {
                comma: Span::new(4, 5)
            }]
        );
        assert_eq!(events, ["declare let x", "end_of_module"]);

        let (_, diags) = module_events("let 42;");
        assert_eq!(
            diags,
            vec![Diag::InvalidBindingInLetStatement {
                binding: Span::new(4, 6)
            }]
        );
    }

    #[test]
    fn test_asi_let_statements() {
        // `let x\n x++` is two statements; no missing-semicolon diagnostic.
        let (events, diags) = module_events("let x\n x++");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            ["declare let x", "use x", "assign x", "end_of_module"]
        );

        // `let\nx++` also splits; only the stray `++` is reported.
        let (_, diags) = module_events("let\nx++");
        assert!(
            !diags
                .iter()
                .any(|d| matches!(d, Diag::MissingSemicolonAfterExpression { .. })),
            "{diags:?}"
        );
    }

    #[test]
    fn test_asi_postfix_across_newline() {
        let (events, diags) = module_events("x\n++\ny");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(events, ["use x", "use y", "assign y", "end_of_module"]);
    }

    #[test]
    fn test_missing_semicolon_reported() {
        let (_, diags) = module_events("x y");
        assert!(diags.contains(&Diag::MissingSemicolonAfterExpression {
            position: Span::new(1, 1)
        }));
    }

    #[test]
    fn test_block_scope_events() {
        let (events, diags) = module_events("{ let x; }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "enter_block_scope",
                "declare let x",
                "exit_block_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_function_declaration_events() {
        let (events, diags) = module_events("function f(a) { b; }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "declare function f",
                "enter_function_scope",
                "declare parameter a",
                "enter_function_scope_body",
                "use b",
                "exit_function_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_named_function_expression_events() {
        let (events, diags) = module_events("let f = function g() { x; };");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "enter_named_function_scope g",
                "enter_function_scope_body",
                "use x",
                "exit_function_scope",
                "declare let f",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_arrow_body_events_replay_in_order() {
        let (events, diags) = module_events("let f = (a) => { a; b; };");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "enter_function_scope",
                "declare parameter a",
                "enter_function_scope_body",
                "use a",
                "use b",
                "exit_function_scope",
                "declare let f",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_class_events() {
        let (events, diags) = module_events("class C { m(p) { x; } y = 1; }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "declare class C",
                "enter_class_scope",
                "property m",
                "enter_function_scope",
                "declare parameter p",
                "enter_function_scope_body",
                "use x",
                "exit_function_scope",
                "property y",
                "exit_class_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_for_loop_events() {
        let (events, diags) = module_events("for (let i = 0; i < n; i++) { f(i); }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "enter_for_scope",
                "declare let i",
                "use i",
                "use n",
                "use i",
                "assign i",
                "enter_block_scope",
                "use f",
                "use i",
                "exit_block_scope",
                "exit_for_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_for_of_events() {
        let (events, diags) = module_events("for (const x of xs) {}");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "enter_for_scope",
                "declare const x",
                "use xs",
                "enter_block_scope",
                "exit_block_scope",
                "exit_for_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_for_in_with_expression_target() {
        let (events, diags) = module_events("for (k in obj) {}");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "assign k",
                "use obj",
                "enter_block_scope",
                "exit_block_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_catch_events() {
        let (events, diags) = module_events("try { x; } catch (e) { e; }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "enter_block_scope",
                "use x",
                "exit_block_scope",
                "enter_block_scope",
                "declare catch e",
                "use e",
                "exit_block_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_import_events() {
        let (events, diags) = module_events("import a, {b, c as d} from 'm';");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "declare import a",
                "declare import b",
                "declare import d",
                "end_of_module"
            ]
        );

        let (events, diags) = module_events("import * as ns from 'm';");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(events, ["declare import ns", "end_of_module"]);
    }

    #[test]
    fn test_typeof_statement_events() {
        let (events, diags) = module_events("typeof neverDeclared;");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(events, ["typeof neverDeclared", "end_of_module"]);
    }

    #[test]
    fn test_switch_events() {
        let (events, diags) = module_events("switch (x) { case 1: y; default: z; }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            events,
            [
                "use x",
                "enter_block_scope",
                "use y",
                "use z",
                "exit_block_scope",
                "end_of_module"
            ]
        );
    }

    #[test]
    fn test_unclosed_block_comment_statement() {
        let (_, diags) = module_events("/* unterminated");
        assert_eq!(
            diags,
            vec![Diag::UnclosedBlockComment {
                comment_open: Span::new(0, 2)
            }]
        );
    }

    #[test]
    fn test_missing_operand_statement() {
        let (_, diags) = module_events("2 + ;");
        assert_eq!(
            diags,
            vec![Diag::MissingOperandForOperator {
                operator: Span::new(2, 3)
            }]
        );
    }

    #[test]
    fn test_module_scope_events_are_balanced_on_garbage() {
        for src in [
            ") } ] ;;; # @",
            "function",
            "if (",
            "class {",
            "for (;;",
            "let",
            "((((",
            "}{)(",
        ] {
            let mut p = TestParser::new(src);
            let mut recorder = BufferingVisitor::new();
            p.parser.parse_and_visit_module(&mut recorder);
            let mut depth: i64 = 0;
            for event in recorder.events() {
                match event {
                    VisitEvent::EnterBlockScope
                    | VisitEvent::EnterClassScope
                    | VisitEvent::EnterForScope
                    | VisitEvent::EnterFunctionScope
                    | VisitEvent::EnterNamedFunctionScope(_) => depth += 1,
                    VisitEvent::ExitBlockScope
                    | VisitEvent::ExitClassScope
                    | VisitEvent::ExitForScope
                    | VisitEvent::ExitFunctionScope => depth -= 1,
                    _ => {}
                }
                assert!(depth >= 0, "{src}: scope exit without enter");
            }
            assert_eq!(depth, 0, "{src}: unbalanced scope events");
        }
    }
}
