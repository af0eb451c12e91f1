use std::collections::HashMap;
use std::mem;

use crate::error::{Error, ResolveError};
use crate::expr::{AssignData, BinaryData, CallData, ExprVisitor, GroupingData, LogicalData, UnaryData, VariableData};
use crate::expr::{Expr, ExprId};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::stmt::{BlockData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt, StmtVisitor, VarData, WhileData};
use crate::token::Token;

#[derive(Clone, Copy)]
enum FunctionType {
    None,
    Function,
}

/// A single static pass over the syntax tree that records, for every local
/// variable use, how many scope frames sit between the use and the
/// declaration. The interpreter later walks exactly that far up the
/// environment chain. Globals get no entry and fall back to a lookup by
/// name at runtime.
pub struct Resolver<'i, 'o> {
    interpreter: &'i mut Interpreter<'o>,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
}

impl<'i, 'o> Resolver<'i, 'o> {
    pub fn new(interpreter: &'i mut Interpreter<'o>) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: FunctionType::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    /// Resolves a function's parameters and body in a fresh scope.
    /// The surrounding function context is restored afterwards so that
    /// return statements are checked against the right function.
    fn resolve_function(&mut self, function: &FunctionData, r#type: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, r#type);

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Marks the name as declared but not yet usable in the innermost scope.
    /// Globals are not tracked and may be redeclared freely.
    fn declare(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        let scope = self.scopes.last_mut().expect("stack to be not empty");
        if scope.contains_key(&name.lexeme) {
            ResolveError {
                token: name.clone(),
                message: "Already a variable with this name in this scope.".to_string(),
            }.throw();
        }
        scope.insert(name.lexeme.to_owned(), false);
    }

    /// Marks the name as fully initialized in the innermost scope.
    fn define(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        self.scopes
            .last_mut()
            .expect("stack to be not empty")
            .insert(name.lexeme.to_owned(), true);
    }

    /// Records the scope distance for the expression if the name is local.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(id, i);
                return;
            }
        }
    }
}

impl ExprVisitor<()> for Resolver<'_, '_> {
    fn visit_literal_expr(&mut self, _literal: &Literal) {}

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) {
        self.resolve_expr(&grouping.expr);
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) {
        self.resolve_expr(&unary.expr);
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) {
        self.resolve_expr(&binary.left);
        self.resolve_expr(&binary.right);
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) {
        self.resolve_expr(&logical.left);
        self.resolve_expr(&logical.right);
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) {
        if let Some(scope) = self.scopes.last() {
            if let Some(defined) = scope.get(&variable.name.lexeme) {
                if !defined {
                    ResolveError {
                        token: variable.name.to_owned(),
                        message: "Can't read local variable in its own initializer.".to_string(),
                    }.throw();
                }
            }
        }

        self.resolve_local(variable.id, &variable.name);
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) {
        self.resolve_expr(&assign.value);
        self.resolve_local(assign.id, &assign.name);
    }

    fn visit_call_expr(&mut self, call: &CallData) {
        self.resolve_expr(&call.callee);

        for argument in &call.arguments {
            self.resolve_expr(argument);
        }
    }

    // A function literal does not bind its name in the enclosing scope;
    // the name only shows up when the value is printed.
    fn visit_function_expr(&mut self, function: &FunctionData) {
        self.resolve_function(function, FunctionType::Function);
    }
}

impl StmtVisitor<()> for Resolver<'_, '_> {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) {
        if let Some(expr) = &expression.expr {
            self.resolve_expr(expr);
        }
    }

    fn visit_print_stmt(&mut self, print: &PrintData) {
        self.resolve_expr(&print.expr);
    }

    fn visit_var_stmt(&mut self, var: &VarData) {
        // Declaring before resolving the initializer is what catches
        // `var a = a;` in a local scope.
        self.declare(&var.name);
        if let Some(initializer) = &var.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&var.name);
    }

    fn visit_block_stmt(&mut self, block: &BlockData) {
        self.begin_scope();
        self.resolve(&block.statements);
        self.end_scope();
    }

    fn visit_if_stmt(&mut self, r#if: &IfData) {
        // Unlike execution, resolution visits every branch that could run.
        self.resolve_expr(&r#if.condition);
        self.resolve_stmt(&r#if.then_branch);
        if let Some(else_branch) = &r#if.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_while_stmt(&mut self, r#while: &WhileData) {
        self.resolve_expr(&r#while.condition);
        self.resolve_stmt(&r#while.body);
    }

    fn visit_return_stmt(&mut self, r#return: &ReturnData) {
        if let FunctionType::None = self.current_function {
            ResolveError {
                token: r#return.keyword.clone(),
                message: "Can't return from top-level code.".to_string(),
            }.throw();
        }

        if let Some(value) = &r#return.value {
            self.resolve_expr(value);
        }
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) {
        // Declaring and defining before resolving the body lets a function
        // recursively refer to itself.
        if let Some(name) = &function.name {
            self.declare(name);
            self.define(name);
        }

        self.resolve_function(function, FunctionType::Function);
    }
}
