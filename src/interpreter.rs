use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{Error, RuntimeError, Unwind};
use crate::expr::{AssignData, BinaryData, CallData, Expr, ExprId, ExprVisitor, GroupingData, LogicalData, UnaryData, VariableData};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{BlockData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt, StmtVisitor, VarData, WhileData};
use crate::token::{Token, Type};

type EvalResult = Result<Object, Unwind>;
type ExecResult = Result<(), Unwind>;

/// Walks the syntax tree and executes it.
///
/// The interpreter owns the global environment, tracks the environment that
/// is current while blocks and calls run, and holds the distance map filled
/// in by the resolver. Print output goes through the injected writer so
/// tests can capture it.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.clone();
            globals.borrow_mut().define(&name, Object::NativeFunction(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Executes the statements in order, stopping at the first runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => continue,
                Err(Unwind::Error(error)) => {
                    error.throw();
                    break;
                },
                // The resolver rejects top-level returns.
                Err(Unwind::Return(_)) => unreachable!("return unwound past every call"),
            }
        }
    }

    /// Records the scope distance of a variable use. Called by the resolver.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes the statements with the given environment as the current
    /// one. The previous environment is restored on every exit, including
    /// an unwind.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = mem::replace(&mut self.environment, environment);

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    /// Looks a variable up at its resolved distance, or in the globals if
    /// the resolver left it alone.
    fn lookup_variable(&self, name: &Token, id: ExprId) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn check_number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), Unwind> {
        match (left, right) {
            (Object::Literal(Literal::Number(left)), Object::Literal(Literal::Number(right))) => {
                Ok((*left, *right))
            },
            _ => Err(RuntimeError {
                token: operator.clone(),
                message: "Operands must be a number.".to_string(),
            }.into()),
        }
    }
}

impl ExprVisitor<EvalResult> for Interpreter<'_> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> EvalResult {
        Ok(Object::Literal(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> EvalResult {
        self.evaluate(&grouping.expr)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> EvalResult {
        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => (-right).ok_or_else(|| RuntimeError {
                token: unary.operator.clone(),
                message: "Operand must be a number.".to_string(),
            }.into()),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> EvalResult {
        // Operands evaluate left to right, before any type checking.
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        match binary.operator.r#type {
            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                let (left, right) = Self::check_number_operands(&binary.operator, &left, &right)?;

                Ok(Object::from(match binary.operator.r#type {
                    Type::Greater       => left > right,
                    Type::GreaterEqual  => left >= right,
                    Type::Less          => left < right,
                    Type::LessEqual     => left <= right,
                    _ => unreachable!(),
                }))
            },
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual  => Ok(Object::from(left != right)),
            Type::Plus => (left + right).ok_or_else(|| RuntimeError {
                token: binary.operator.clone(),
                message: "Operands must be two numbers or two strings.".to_string(),
            }.into()),
            Type::Minus => (left - right).ok_or_else(|| RuntimeError {
                token: binary.operator.clone(),
                message: "Operands must be a number.".to_string(),
            }.into()),
            Type::Slash => (left / right).ok_or_else(|| RuntimeError {
                token: binary.operator.clone(),
                message: "Operands must be a number.".to_string(),
            }.into()),
            Type::Star => (left * right).ok_or_else(|| RuntimeError {
                token: binary.operator.clone(),
                message: "Operands must be a number.".to_string(),
            }.into()),
            _ => unreachable!(),
        }
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> EvalResult {
        let left = self.evaluate(&logical.left)?;

        // Short-circuiting returns the operand itself, not a boolean.
        if logical.operator.r#type == Type::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&logical.right)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> EvalResult {
        Ok(self.lookup_variable(&variable.name, variable.id)?)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> EvalResult {
        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.id) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            },
            None => self.globals.borrow_mut().assign(&assign.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> EvalResult {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let function: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(function) => function,
            _ => {
                return Err(RuntimeError {
                    token: call.paren.clone(),
                    message: "Can only call functions and classes".to_string(),
                }.into());
            },
        };

        if arguments.len() != function.arity() {
            return Err(RuntimeError {
                token: call.paren.clone(),
                message: format!("Expected {} arguments but got {}.", function.arity(), arguments.len()),
            }.into());
        }

        function.call(self, arguments)
    }

    fn visit_function_expr(&mut self, function: &FunctionData) -> EvalResult {
        Ok(Object::Function(Function {
            declaration: function.clone(),
            closure: Rc::clone(&self.environment),
        }))
    }
}

impl StmtVisitor<ExecResult> for Interpreter<'_> {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) -> ExecResult {
        if let Some(expr) = &expression.expr {
            self.evaluate(expr)?;
        }

        Ok(())
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> ExecResult {
        let value = self.evaluate(&print.expr)?;
        writeln!(self.output, "{value}").expect("output to be writable");

        Ok(())
    }

    fn visit_var_stmt(&mut self, var: &VarData) -> ExecResult {
        let value = match &var.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Literal(Literal::Nil),
        };

        self.environment.borrow_mut().define(&var.name.lexeme, value);

        Ok(())
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> ExecResult {
        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&block.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, r#if: &IfData) -> ExecResult {
        if self.evaluate(&r#if.condition)?.is_truthy() {
            self.execute(&r#if.then_branch)?;
        } else if let Some(else_branch) = &r#if.else_branch {
            self.execute(else_branch)?;
        }

        Ok(())
    }

    fn visit_while_stmt(&mut self, r#while: &WhileData) -> ExecResult {
        while self.evaluate(&r#while.condition)?.is_truthy() {
            self.execute(&r#while.body)?;
        }

        Ok(())
    }

    fn visit_return_stmt(&mut self, r#return: &ReturnData) -> ExecResult {
        let value = match &r#return.value {
            Some(value) => self.evaluate(value)?,
            None => Object::Literal(Literal::Nil),
        };

        Err(Unwind::Return(value))
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) -> ExecResult {
        let value = Function {
            declaration: function.clone(),
            closure: Rc::clone(&self.environment),
        };

        // An anonymous declaration is allowed; it just binds nothing.
        if let Some(name) = &function.name {
            self.environment.borrow_mut().define(&name.lexeme, Object::Function(value));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn token(r#type: Type, lexeme: &str) -> Token {
        Token::new(r#type, String::from(lexeme), None, 1)
    }

    fn number(value: f64) -> Expr {
        Expr::Literal(Literal::Number(value))
    }

    fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
        Expr::Binary(BinaryData {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn runtime_message(result: EvalResult) -> String {
        match result {
            Err(Unwind::Error(error)) => error.message,
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_literal() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        assert_eq!(interpreter.evaluate(&number(12.0)).unwrap(), Object::from(12.0));
    }

    #[test]
    fn evaluate_unary_minus() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(number(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(-12.0));
    }

    #[test]
    fn evaluate_unary_minus_on_string_fails() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(Expr::Literal(Literal::from("muffin"))),
        });
        assert_eq!(runtime_message(interpreter.evaluate(&expr)), "Operand must be a number.");
    }

    #[test]
    fn evaluate_bang_uses_truthiness() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Bang, "!"),
            expr: Box::new(Expr::Literal(Literal::Nil)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));
    }

    #[test]
    fn evaluate_arithmetic() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = binary(
            number(6.0),
            token(Type::Minus, "-"),
            binary(number(12.0), token(Type::Minus, "-"), number(24.0)),
        );
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(18.0));
    }

    #[test]
    fn evaluate_string_concatenation() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = binary(
            Expr::Literal(Literal::from("Hello")),
            token(Type::Plus, "+"),
            Expr::Literal(Literal::from("World")),
        );
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("HelloWorld"));
    }

    #[test]
    fn evaluate_string_plus_number_fails() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = binary(
            Expr::Literal(Literal::from("hi")),
            token(Type::Plus, "+"),
            number(1.0),
        );
        assert_eq!(
            runtime_message(interpreter.evaluate(&expr)),
            "Operands must be two numbers or two strings."
        );
    }

    #[test]
    fn evaluate_comparisons() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let less = binary(number(1.0), token(Type::Less, "<"), number(2.0));
        assert_eq!(interpreter.evaluate(&less).unwrap(), Object::from(true));

        let greater_equal = binary(number(1.0), token(Type::GreaterEqual, ">="), number(2.0));
        assert_eq!(interpreter.evaluate(&greater_equal).unwrap(), Object::from(false));
    }

    #[test]
    fn evaluate_comparison_on_strings_fails() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = binary(
            Expr::Literal(Literal::from("a")),
            token(Type::Less, "<"),
            Expr::Literal(Literal::from("b")),
        );
        assert_eq!(runtime_message(interpreter.evaluate(&expr)), "Operands must be a number.");
    }

    #[test]
    fn evaluate_equality_across_types_is_false() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = binary(
            number(1.0),
            token(Type::EqualEqual, "=="),
            Expr::Literal(Literal::from("1")),
        );
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(false));
    }

    #[test]
    fn division_by_zero_is_ieee() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = binary(number(1.0), token(Type::Slash, "/"), number(0.0));
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(f64::INFINITY));
    }

    #[test]
    fn logical_operators_return_operands() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let or = Expr::Logical(LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::Or, "or"),
            right: Box::new(Expr::Literal(Literal::from("yes"))),
        });
        assert_eq!(interpreter.evaluate(&or).unwrap(), Object::from("yes"));

        let and = Expr::Logical(LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::And, "and"),
            right: Box::new(Expr::Literal(Literal::from("unreached"))),
        });
        assert_eq!(interpreter.evaluate(&and).unwrap(), Object::Literal(Literal::Nil));
    }

    #[test]
    fn print_writes_to_the_output() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let statement = Stmt::Print(PrintData {
            expr: binary(number(1.0), token(Type::Plus, "+"), number(2.0)),
        });
        interpreter.execute(&statement).unwrap();

        drop(interpreter);
        assert_eq!(std::str::from_utf8(&output).unwrap(), "3\n");
    }

    #[test]
    fn blocks_restore_the_environment() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let before = Rc::clone(&interpreter.environment);

        let block = Stmt::Block(BlockData {
            statements: vec![Stmt::Var(VarData {
                name: token(Type::Identifier, "a"),
                initializer: Some(number(1.0)),
            })],
        });
        interpreter.execute(&block).unwrap();

        assert!(Rc::ptr_eq(&before, &interpreter.environment));
    }

    #[test]
    fn return_unwinds_with_its_value() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let statement = Stmt::Return(ReturnData {
            keyword: token(Type::Return, "return"),
            value: Some(number(7.0)),
        });

        match interpreter.execute(&statement) {
            Err(Unwind::Return(value)) => assert_eq!(value, Object::from(7.0)),
            other => panic!("expected a return unwind, got {other:?}"),
        }
    }

    #[test]
    fn calling_a_number_fails() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Call(CallData {
            callee: Box::new(number(1.0)),
            paren: token(Type::RightParen, ")"),
            arguments: vec![],
        });
        assert_eq!(
            runtime_message(interpreter.evaluate(&expr)),
            "Can only call functions and classes"
        );
    }

    #[test]
    fn clock_arity_is_checked() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Call(CallData {
            callee: Box::new(Expr::Variable(VariableData {
                name: token(Type::Identifier, "clock"),
                id: crate::expr::next_id(),
            })),
            paren: token(Type::RightParen, ")"),
            arguments: vec![number(1.0)],
        });
        assert_eq!(
            runtime_message(interpreter.evaluate(&expr)),
            "Expected 0 arguments but got 1."
        );
    }
}
