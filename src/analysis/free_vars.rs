//! Scope-tracking walk that collects free identifiers
//!
//! Function literals push a scope holding their parameter names; an
//! identifier is free when no enclosing scope binds it and it is not a
//! built-in. Block-bodied functions are not entered at all.

use crate::analysis::AnalyzerOptions;
use crate::frontend::ast::*;
use std::collections::{BTreeSet, HashSet};

/// Sorted, de-duplicated identifier names
pub type IdentifierSet = BTreeSet<String>;

pub struct FreeVariableCollector<'a> {
    options: &'a AnalyzerOptions,
    // Innermost scope last
    scopes: Vec<HashSet<String>>,
    found: IdentifierSet,
}

/// Pending work for the walk; an explicit stack keeps long chains off the call stack
enum Task<'e> {
    Expr(&'e Expr),
    Pattern(&'e Pattern),
    Key(&'e PropertyKey),
    PopScope,
}

impl<'a> FreeVariableCollector<'a> {
    pub fn new(options: &'a AnalyzerOptions) -> Self {
        Self {
            options,
            scopes: Vec::new(),
            found: IdentifierSet::new(),
        }
    }

    pub fn visit(&mut self, expr: &Expr) {
        let mut tasks = vec![Task::Expr(expr)];

        while let Some(task) = tasks.pop() {
            match task {
                Task::Expr(expr) => self.visit_expr(expr, &mut tasks),
                Task::Pattern(pattern) => visit_pattern(pattern, &mut tasks),
                Task::Key(PropertyKey::Computed(expr)) => tasks.push(Task::Expr(expr)),
                Task::Key(PropertyKey::Static(_)) => {}
                Task::PopScope => self.pop_scope(),
            }
        }
    }

    /// Consume the collector and return what it found
    pub fn finish(self) -> IdentifierSet {
        if !self.scopes.is_empty() {
            log::warn!("Free-variable walk ended with {} open scopes", self.scopes.len());
        }
        self.found
    }

    // Children are pushed last-first so they are visited in source order
    fn visit_expr<'e>(&mut self, expr: &'e Expr, tasks: &mut Vec<Task<'e>>) {
        match expr {
            Expr::Identifier(name) => self.reference(name),
            Expr::Literal(_) => {}
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                tasks.push(Task::Expr(right));
                tasks.push(Task::Expr(left));
            }
            Expr::Unary { argument, .. } => tasks.push(Task::Expr(argument)),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                tasks.push(Task::Expr(alternate));
                tasks.push(Task::Expr(consequent));
                tasks.push(Task::Expr(test));
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                // `b` in `a.b` is a field label
                if *computed {
                    tasks.push(Task::Expr(property));
                }
                tasks.push(Task::Expr(object));
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                tasks.extend(arguments.iter().rev().map(Task::Expr));
                tasks.push(Task::Expr(callee));
            }
            Expr::Array { elements } => {
                tasks.extend(elements.iter().rev().flatten().map(Task::Expr));
            }
            Expr::Object { properties } => {
                for property in properties.iter().rev() {
                    match property {
                        ObjectProperty::KeyValue { key, value, .. } => {
                            tasks.push(Task::Expr(value));
                            tasks.push(Task::Key(key));
                        }
                        ObjectProperty::Spread(argument) => tasks.push(Task::Expr(argument)),
                    }
                }
            }
            Expr::Function(function) => self.visit_function(function, tasks),
            Expr::Other { kind, children } => {
                log::trace!("Visiting {} children of {}", children.len(), kind.node_kind());
                tasks.extend(children.iter().rev().map(Task::Expr));
            }
        }
    }

    /// Parameters bind for the defaults and the body; the scope closes once both are walked
    fn visit_function<'e>(&mut self, function: &'e Function, tasks: &mut Vec<Task<'e>>) {
        let body = match &function.body {
            FunctionBody::Expression(body) => body,
            FunctionBody::Block => {
                log::trace!("Not descending into block-bodied {}", kind_label(function));
                return;
            }
        };

        let mut bound = Vec::new();
        for param in &function.params {
            param.bound_names(&mut bound);
        }

        self.push_scope(bound);
        tasks.push(Task::PopScope);
        tasks.push(Task::Expr(body));
        tasks.extend(function.params.iter().rev().map(Task::Pattern));
    }

    fn reference(&mut self, name: &str) {
        if self.options.is_builtin(name) || self.is_bound(name) {
            return;
        }
        if !self.found.contains(name) {
            self.found.insert(name.to_string());
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn push_scope(&mut self, names: Vec<String>) {
        self.scopes.push(names.into_iter().collect());
    }

    fn pop_scope(&mut self) {
        if self.scopes.pop().is_none() {
            log::warn!("Attempted to pop a binding scope that was never pushed");
        }
    }
}

/// Defaults and computed keys inside a binding pattern
fn visit_pattern<'e>(pattern: &'e Pattern, tasks: &mut Vec<Task<'e>>) {
    match pattern {
        Pattern::Identifier(_) => {}
        Pattern::Object(properties) => {
            for property in properties.iter().rev() {
                match property {
                    PatternProperty::KeyValue { key, value } => {
                        tasks.push(Task::Pattern(value));
                        tasks.push(Task::Key(key));
                    }
                    PatternProperty::Rest(rest) => tasks.push(Task::Pattern(rest)),
                }
            }
        }
        Pattern::Array(elements) => {
            tasks.extend(elements.iter().rev().flatten().map(Task::Pattern));
        }
        Pattern::Rest(inner) => tasks.push(Task::Pattern(inner)),
        Pattern::Default { target, default } => {
            tasks.push(Task::Expr(default));
            tasks.push(Task::Pattern(target));
        }
    }
}

fn kind_label(function: &Function) -> &'static str {
    if function.is_arrow {
        "arrow function"
    } else {
        "function"
    }
}
