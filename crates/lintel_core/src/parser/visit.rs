//! Visit events and their consumers.
//!
//! The parser describes the scope structure of a module as a stream of
//! [`VisitEvent`]s delivered to a [`Visitor`]: scope entries and exits,
//! variable declarations, and variable uses. The scope analyzer is the real
//! consumer; [`BufferingVisitor`] records a stream for later replay (function
//! and arrow bodies are parsed before the surrounding expression finishes,
//! but must be analyzed in source order).

use crate::language::VarKind;
use crate::parser::scanner::Ident;

// ─────────────────────────────────────────────────────────────────────────────
// Visitor
// ─────────────────────────────────────────────────────────────────────────────

/// Consumer of the parser's scope/variable event stream.
pub trait Visitor<'a> {
    /// A `{ … }` block scope begins.
    fn visit_enter_block_scope(&mut self);
    /// A class body begins.
    fn visit_enter_class_scope(&mut self);
    /// A `for` statement with lexical bindings begins.
    fn visit_enter_for_scope(&mut self);
    /// A function scope begins (parameters and body).
    fn visit_enter_function_scope(&mut self);
    /// Parameters are complete; the function body begins.
    fn visit_enter_function_scope_body(&mut self);
    /// A named function expression's scope begins; `name` is visible inside
    /// this scope only.
    fn visit_enter_named_function_scope(&mut self, name: Ident<'a>);
    /// The matching scope exits.
    fn visit_exit_block_scope(&mut self);
    /// The matching scope exits.
    fn visit_exit_class_scope(&mut self);
    /// The matching scope exits.
    fn visit_exit_for_scope(&mut self);
    /// The matching scope exits.
    fn visit_exit_function_scope(&mut self);
    /// A class member name (field or method).
    fn visit_property_declaration(&mut self, name: Ident<'a>);
    /// A variable declaration of the given kind.
    fn visit_variable_declaration(&mut self, name: Ident<'a>, kind: VarKind);
    /// A write to a variable.
    fn visit_variable_assignment(&mut self, name: Ident<'a>);
    /// A `typeof name` read (exempt from undeclared-variable reporting).
    fn visit_variable_typeof_use(&mut self, name: Ident<'a>);
    /// A read of a variable.
    fn visit_variable_use(&mut self, name: Ident<'a>);
    /// The whole module has been parsed.
    fn visit_end_of_module(&mut self);
}

// ─────────────────────────────────────────────────────────────────────────────
// VisitEvent
// ─────────────────────────────────────────────────────────────────────────────

/// One recorded [`Visitor`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitEvent<'a> {
    EnterBlockScope,
    EnterClassScope,
    EnterForScope,
    EnterFunctionScope,
    EnterFunctionScopeBody,
    EnterNamedFunctionScope(Ident<'a>),
    ExitBlockScope,
    ExitClassScope,
    ExitForScope,
    ExitFunctionScope,
    PropertyDeclaration(Ident<'a>),
    VariableDeclaration(Ident<'a>, VarKind),
    VariableAssignment(Ident<'a>),
    VariableTypeofUse(Ident<'a>),
    VariableUse(Ident<'a>),
    EndOfModule,
}

// ─────────────────────────────────────────────────────────────────────────────
// BufferingVisitor
// ─────────────────────────────────────────────────────────────────────────────

/// Records visit events in order for a single later replay.
#[derive(Debug, Default)]
pub struct BufferingVisitor<'a> {
    events: Vec<VisitEvent<'a>>,
}

impl<'a> BufferingVisitor<'a> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events, in order.
    pub fn events(&self) -> &[VisitEvent<'a>] {
        &self.events
    }

    /// Replay every recorded event into `target`, consuming the recorder.
    pub fn move_into(self, target: &mut dyn Visitor<'a>) {
        for event in self.events {
            match event {
                VisitEvent::EnterBlockScope => target.visit_enter_block_scope(),
                VisitEvent::EnterClassScope => target.visit_enter_class_scope(),
                VisitEvent::EnterForScope => target.visit_enter_for_scope(),
                VisitEvent::EnterFunctionScope => target.visit_enter_function_scope(),
                VisitEvent::EnterFunctionScopeBody => target.visit_enter_function_scope_body(),
                VisitEvent::EnterNamedFunctionScope(name) => {
                    target.visit_enter_named_function_scope(name)
                }
                VisitEvent::ExitBlockScope => target.visit_exit_block_scope(),
                VisitEvent::ExitClassScope => target.visit_exit_class_scope(),
                VisitEvent::ExitForScope => target.visit_exit_for_scope(),
                VisitEvent::ExitFunctionScope => target.visit_exit_function_scope(),
                VisitEvent::PropertyDeclaration(name) => target.visit_property_declaration(name),
                VisitEvent::VariableDeclaration(name, kind) => {
                    target.visit_variable_declaration(name, kind)
                }
                VisitEvent::VariableAssignment(name) => target.visit_variable_assignment(name),
                VisitEvent::VariableTypeofUse(name) => target.visit_variable_typeof_use(name),
                VisitEvent::VariableUse(name) => target.visit_variable_use(name),
                VisitEvent::EndOfModule => target.visit_end_of_module(),
            }
        }
    }
}

impl<'a> Visitor<'a> for BufferingVisitor<'a> {
    fn visit_enter_block_scope(&mut self) {
        self.events.push(VisitEvent::EnterBlockScope);
    }

    fn visit_enter_class_scope(&mut self) {
        self.events.push(VisitEvent::EnterClassScope);
    }

    fn visit_enter_for_scope(&mut self) {
        self.events.push(VisitEvent::EnterForScope);
    }

    fn visit_enter_function_scope(&mut self) {
        self.events.push(VisitEvent::EnterFunctionScope);
    }

    fn visit_enter_function_scope_body(&mut self) {
        self.events.push(VisitEvent::EnterFunctionScopeBody);
    }

    fn visit_enter_named_function_scope(&mut self, name: Ident<'a>) {
        self.events.push(VisitEvent::EnterNamedFunctionScope(name));
    }

    fn visit_exit_block_scope(&mut self) {
        self.events.push(VisitEvent::ExitBlockScope);
    }

    fn visit_exit_class_scope(&mut self) {
        self.events.push(VisitEvent::ExitClassScope);
    }

    fn visit_exit_for_scope(&mut self) {
        self.events.push(VisitEvent::ExitForScope);
    }

    fn visit_exit_function_scope(&mut self) {
        self.events.push(VisitEvent::ExitFunctionScope);
    }

    fn visit_property_declaration(&mut self, name: Ident<'a>) {
        self.events.push(VisitEvent::PropertyDeclaration(name));
    }

    fn visit_variable_declaration(&mut self, name: Ident<'a>, kind: VarKind) {
        self.events.push(VisitEvent::VariableDeclaration(name, kind));
    }

    fn visit_variable_assignment(&mut self, name: Ident<'a>) {
        self.events.push(VisitEvent::VariableAssignment(name));
    }

    fn visit_variable_typeof_use(&mut self, name: Ident<'a>) {
        self.events.push(VisitEvent::VariableTypeofUse(name));
    }

    fn visit_variable_use(&mut self, name: Ident<'a>) {
        self.events.push(VisitEvent::VariableUse(name));
    }

    fn visit_end_of_module(&mut self) {
        self.events.push(VisitEvent::EndOfModule);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
