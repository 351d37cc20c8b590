//! Scope analysis and variable resolution.
//!
//! [`Linter`] consumes the parser's visit-event stream and maintains a stack
//! of lexical scopes. Declarations are checked for illegal redeclaration as
//! they arrive; uses are resolved when their scope exits, so `var` hoisting
//! and forward references to functions work without lookahead. Uses that do
//! not resolve in a scope propagate to the parent; whatever survives at
//! `end_of_module` is checked against the predefined-global table and then
//! reported as undeclared.
//!
//! Reported findings:
//!
//! - **Redeclarations** — a `let`/`const`/`class`/`import` conflicting with
//!   any other declaration of the same name in one scope (in either
//!   direction), and shadowing of non-writable predefined globals.
//! - **Illegal assignments** — writes to `const` and `import` bindings, to
//!   const globals, and writes that precede a same-scope lexical declaration.
//! - **Use before declaration** — reads of `let`/`const`/`class` bindings
//!   before their declaration in the same scope.
//! - **Undeclared variables** — reads and writes that resolve nowhere;
//!   `typeof` reads are exempt.

use std::collections::HashMap;

use crate::diag::{Diag, DiagReporter};
use crate::language::VarKind;
use crate::parser::scanner::Ident;
use crate::parser::visit::Visitor;
use crate::source::Span;

// ─────────────────────────────────────────────────────────────────────────────
// Predefined globals
// ─────────────────────────────────────────────────────────────────────────────

/// Writable names every script can see (ECMAScript intrinsics plus the usual
/// host objects).
static WRITABLE_GLOBALS: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "Atomics",
    "BigInt",
    "BigInt64Array",
    "BigUint64Array",
    "Boolean",
    "DataView",
    "Date",
    "Error",
    "EvalError",
    "Float32Array",
    "Float64Array",
    "Function",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "JSON",
    "Map",
    "Math",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Set",
    "SharedArrayBuffer",
    "String",
    "Symbol",
    "SyntaxError",
    "TypeError",
    "URIError",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "WeakMap",
    "WeakSet",
    "clearInterval",
    "clearTimeout",
    "console",
    "decodeURI",
    "decodeURIComponent",
    "document",
    "encodeURI",
    "encodeURIComponent",
    "eval",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "setInterval",
    "setTimeout",
    "window",
];

/// Non-writable globals; assigning to or shadowing these is an error.
static CONST_GLOBALS: &[&str] = &["Infinity", "NaN", "globalThis", "undefined"];

fn writable_global(name: &str) -> bool {
    WRITABLE_GLOBALS.contains(&name)
}

fn const_global(name: &str) -> bool {
    CONST_GLOBALS.contains(&name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope data
// ─────────────────────────────────────────────────────────────────────────────

/// Where a declaration was written relative to the scope holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaredScope {
    /// Declared directly in this scope.
    Current,
    /// A `var` hoisted here out of a descendant block scope.
    Descendant,
}

/// One declaration of a name.
#[derive(Debug, Clone, Copy)]
struct DeclaredVariable<'a> {
    kind: VarKind,
    /// The declaring identifier. Always present for user declarations;
    /// predefined globals have no source location and live outside the scope
    /// map.
    declaration: Option<Ident<'a>>,
    declared_scope: DeclaredScope,
}

/// How a variable was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UsedVariableKind {
    Assignment,
    Typeof,
    Use,
}

#[derive(Debug, Clone, Copy)]
struct UsedVariable<'a> {
    name: Ident<'a>,
    kind: UsedVariableKind,
}

/// One lexical scope: its declarations (insertion-ordered per name) and the
/// uses waiting for resolution.
///
/// Uses arriving from descendant scopes are kept apart from this scope's own
/// uses: `var` hoisting must look upward through block boundaries, while
/// use-before-declaration errors for lexical bindings fire only when use and
/// declaration share a scope.
#[derive(Default)]
struct Scope<'a> {
    declared_variables: HashMap<&'a str, Vec<DeclaredVariable<'a>>>,
    variables_used: Vec<UsedVariable<'a>>,
    variables_used_in_descendant_scope: Vec<UsedVariable<'a>>,
    /// For named function expressions: the function's own name, visible only
    /// inside its body.
    function_expression_declaration: Option<(&'a str, DeclaredVariable<'a>)>,
}

impl<'a> Scope<'a> {
    fn find_declared(&self, name: &str) -> Option<&DeclaredVariable<'a>> {
        if let Some((own_name, declaration)) = &self.function_expression_declaration {
            if *own_name == name {
                return Some(declaration);
            }
        }
        self.declared_variables
            .get(name)
            .and_then(|declarations| declarations.first())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Linter
// ─────────────────────────────────────────────────────────────────────────────

/// The scope analyzer: a [`Visitor`] resolving variable references against a
/// stack of lexical scopes.
pub struct Linter<'a> {
    scopes: Vec<Scope<'a>>,
    reporter: &'a dyn DiagReporter,
}

impl<'a> Linter<'a> {
    /// Create a linter whose bottom scope is the module scope.
    pub fn new(reporter: &'a dyn DiagReporter) -> Self {
        Self {
            scopes: vec![Scope::default()],
            reporter,
        }
    }

    fn current_scope(&mut self) -> &mut Scope<'a> {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty during analysis")
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Check declaration conflicts, then record the declaration.
    fn declare_variable(
        &mut self,
        name: Ident<'a>,
        kind: VarKind,
        declared_scope: DeclaredScope,
    ) {
        let reporter = self.reporter;
        if const_global(name.name) {
            reporter.report(Diag::RedeclarationOfGlobalVariable {
                redeclaration: name.span,
            });
        }
        let scope = self.current_scope();
        if let Some(existing) = scope.declared_variables.get(name.name) {
            if let Some(conflict) = existing
                .iter()
                .find(|declared| !redeclaration_ok(kind, declared.kind))
            {
                let original = conflict
                    .declaration
                    .map(|ident| ident.span)
                    .unwrap_or(name.span);
                reporter.report(Diag::RedeclarationOfVariable {
                    redeclaration: name.span,
                    original_declaration: original,
                });
            }
        }
        self.current_scope()
            .declared_variables
            .entry(name.name)
            .or_default()
            .push(DeclaredVariable {
                kind,
                declaration: Some(name),
                declared_scope,
            });
    }

    fn record_use(&mut self, name: Ident<'a>, kind: UsedVariableKind) {
        self.current_scope()
            .variables_used
            .push(UsedVariable { name, kind });
    }

    /// Check a use that resolved to `declared`. `same_scope` is `true` when
    /// the use came from the scope holding the declaration (the only place
    /// position-based checks apply).
    fn check_use_against_declaration(
        &self,
        declared: &DeclaredVariable<'a>,
        used: &UsedVariable<'a>,
        same_scope: bool,
    ) {
        let declaration_span = declared
            .declaration
            .map(|ident| ident.span)
            .unwrap_or(Span::empty_at(0));
        match used.kind {
            UsedVariableKind::Assignment => match declared.kind {
                VarKind::Const | VarKind::Import => {
                    self.reporter.report(Diag::AssignmentToConstVariable {
                        declaration: declaration_span,
                        assignment: used.name.span,
                        kind: declared.kind,
                    });
                }
                VarKind::Let | VarKind::Class
                    if same_scope
                        && declared.declared_scope == DeclaredScope::Current
                        && used.name.span.begin < declaration_span.begin =>
                {
                    self.reporter
                        .report(Diag::AssignmentBeforeVariableDeclaration {
                            assignment: used.name.span,
                            declaration: declaration_span,
                        });
                }
                _ => {}
            },
            UsedVariableKind::Use | UsedVariableKind::Typeof => {
                let lexical = matches!(declared.kind, VarKind::Let | VarKind::Const | VarKind::Class);
                if lexical
                    && same_scope
                    && declared.declared_scope == DeclaredScope::Current
                    && used.name.span.begin < declaration_span.begin
                {
                    self.reporter.report(Diag::VariableUsedBeforeDeclaration {
                        use_of_variable: used.name.span,
                        declaration: declaration_span,
                    });
                }
            }
        }
    }

    /// Resolve the exiting scope's uses, move what is left to the parent, and
    /// (for block-like scopes) hoist `var` declarations upward.
    fn propagate_to_parent(&mut self, is_function_scope: bool) {
        let exiting = self.scopes.pop().expect("cannot exit the module scope");
        let mut propagated: Vec<UsedVariable<'a>> = Vec::new();

        for used in &exiting.variables_used {
            match exiting.find_declared(used.name.name) {
                Some(declared) => {
                    self.check_use_against_declaration(declared, used, true);
                }
                None => {
                    // The implicit `arguments` object stops at the function
                    // boundary.
                    if is_function_scope && used.name.name == "arguments" {
                        continue;
                    }
                    propagated.push(*used);
                }
            }
        }
        for used in &exiting.variables_used_in_descendant_scope {
            match exiting.find_declared(used.name.name) {
                Some(declared) => {
                    self.check_use_against_declaration(declared, used, false);
                }
                None => {
                    if is_function_scope && used.name.name == "arguments" {
                        continue;
                    }
                    propagated.push(*used);
                }
            }
        }
        self.scopes
            .last_mut()
            .expect("cannot exit the module scope")
            .variables_used_in_descendant_scope
            .extend(propagated);

        if !is_function_scope {
            // Hoist `var` declarations into the parent; the walk repeats at
            // each block exit until a function or module scope holds them.
            let mut hoisted: Vec<(Ident<'a>, VarKind)> = Vec::new();
            for declarations in exiting.declared_variables.values() {
                for declared in declarations {
                    if declared.kind == VarKind::Var {
                        if let Some(ident) = declared.declaration {
                            hoisted.push((ident, VarKind::Var));
                        }
                    }
                }
            }
            // Insertion order within one name is preserved; order across
            // names follows the map and is irrelevant because hoisted vars
            // never produce position-based diagnostics.
            for (ident, kind) in hoisted {
                self.declare_variable(ident, kind, DeclaredScope::Descendant);
            }
        }
    }

    /// Resolve a module-scope survivor against the predefined globals, or
    /// report it as undeclared.
    fn report_unresolved(&self, used: &UsedVariable<'a>) {
        if writable_global(used.name.name) {
            return;
        }
        if const_global(used.name.name) {
            if used.kind == UsedVariableKind::Assignment {
                self.reporter.report(Diag::AssignmentToConstGlobalVariable {
                    assignment: used.name.span,
                });
            }
            return;
        }
        match used.kind {
            UsedVariableKind::Typeof => {}
            UsedVariableKind::Use => {
                self.reporter.report(Diag::UseOfUndeclaredVariable {
                    name: used.name.span,
                });
            }
            UsedVariableKind::Assignment => {
                self.reporter.report(Diag::AssignmentToUndeclaredVariable {
                    assignment: used.name.span,
                });
            }
        }
    }
}

impl<'a> Visitor<'a> for Linter<'a> {
    fn visit_enter_block_scope(&mut self) {
        self.push_scope();
    }

    fn visit_enter_class_scope(&mut self) {
        self.push_scope();
    }

    fn visit_enter_for_scope(&mut self) {
        self.push_scope();
    }

    fn visit_enter_function_scope(&mut self) {
        self.push_scope();
    }

    fn visit_enter_function_scope_body(&mut self) {
        // Parameters and body share one scope here.
    }

    fn visit_enter_named_function_scope(&mut self, name: Ident<'a>) {
        self.push_scope();
        self.current_scope().function_expression_declaration = Some((
            name.name,
            DeclaredVariable {
                kind: VarKind::Function,
                declaration: Some(name),
                declared_scope: DeclaredScope::Current,
            },
        ));
    }

    fn visit_exit_block_scope(&mut self) {
        self.propagate_to_parent(false);
    }

    fn visit_exit_class_scope(&mut self) {
        self.propagate_to_parent(false);
    }

    fn visit_exit_for_scope(&mut self) {
        self.propagate_to_parent(false);
    }

    fn visit_exit_function_scope(&mut self) {
        self.propagate_to_parent(true);
    }

    fn visit_property_declaration(&mut self, _name: Ident<'a>) {
        // Class members are properties, not variables.
    }

    fn visit_variable_declaration(&mut self, name: Ident<'a>, kind: VarKind) {
        self.declare_variable(name, kind, DeclaredScope::Current);
    }

    fn visit_variable_assignment(&mut self, name: Ident<'a>) {
        self.record_use(name, UsedVariableKind::Assignment);
    }

    fn visit_variable_typeof_use(&mut self, name: Ident<'a>) {
        self.record_use(name, UsedVariableKind::Typeof);
    }

    fn visit_variable_use(&mut self, name: Ident<'a>) {
        self.record_use(name, UsedVariableKind::Use);
    }

    fn visit_end_of_module(&mut self) {
        tracing::debug!(scopes = self.scopes.len(), "resolving module scope");
        debug_assert_eq!(self.scopes.len(), 1, "unbalanced scope events");
        let module = self.scopes.last().expect("module scope always exists");
        for used in &module.variables_used {
            match module.find_declared(used.name.name) {
                Some(declared) => self.check_use_against_declaration(declared, used, true),
                None => self.report_unresolved(used),
            }
        }
        for used in &module.variables_used_in_descendant_scope {
            match module.find_declared(used.name.name) {
                Some(declared) => self.check_use_against_declaration(declared, used, false),
                None => self.report_unresolved(used),
            }
        }
    }
}

/// Returns `true` when declaring `new_kind` over an existing `old_kind` for
/// the same name in one scope is legal.
///
/// `var`, `function`, parameters, and catch bindings freely coexist (sloppy
/// JavaScript allows all those duplications); any pairing that involves a
/// lexical kind (`let`, `const`, `class`, `import`) on either side is a
/// redeclaration error.
fn redeclaration_ok(new_kind: VarKind, old_kind: VarKind) -> bool {
    fn relaxed(kind: VarKind) -> bool {
        matches!(
            kind,
            VarKind::Var | VarKind::Function | VarKind::Parameter | VarKind::Catch
        )
    }
    relaxed(new_kind) && relaxed(old_kind)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
