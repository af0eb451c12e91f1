use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprVisitor, GroupingData, LogicalData, UnaryData,
    VariableData,
};
use crate::literal::Literal;
use crate::stmt::{
    BlockData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt, StmtVisitor,
    VarData, WhileData,
};

/// Returns a string representation of the expression in paranthesize.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Renders the syntax tree in parenthesized prefix form.
/// Used by the parser's tests and handy when debugging precedence.
pub struct ASTPrinter;

impl ASTPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    fn function(&mut self, function: &FunctionData) -> String {
        let mut string = String::new();
        string += "(fun";
        if let Some(name) = &function.name {
            string += " ";
            string += &name.lexeme;
        }
        string += " (";
        string += &function.params.iter()
            .map(|param| param.lexeme.clone())
            .collect::<Vec<String>>()
            .join(" ");
        string += ") { ";
        string += &function.body.iter()
            .map(|stmt| stmt.accept(self))
            .collect::<Vec<String>>()
            .join(" ");
        string += " })";

        string
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        literal.to_string() // Uses fmt::Display impl for Literal
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> String {
        parenthesize!(self, "group", grouping.expr)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> String {
        parenthesize!(self, &unary.operator.lexeme, &unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> String {
        parenthesize!(self, &binary.operator.lexeme, &binary.left, &binary.right)
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> String {
        parenthesize!(self, &logical.operator.lexeme, &logical.left, &logical.right)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &assign.name.lexeme).as_str(), assign.value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> String {
        let mut string = String::new();
        string += &call.callee.accept(self);
        string += "(";
        string += &call.arguments.iter()
            .map(|arg| arg.accept(self))
            .collect::<Vec<String>>()
            .join(" ");
        string += ")";
        string
    }

    fn visit_function_expr(&mut self, function: &FunctionData) -> String {
        self.function(function)
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_expression_stmt(&mut self, expression: &ExpressionData) -> String {
        match &expression.expr {
            Some(expr) => parenthesize!(self, "expr", expr),
            None => String::from("(expr)"),
        }
    }

    fn visit_print_stmt(&mut self, print: &PrintData) -> String {
        parenthesize!(self, "print", print.expr)
    }

    fn visit_var_stmt(&mut self, var: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &var.name.lexeme;
        if let Some(initializer) = &var.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";

        string
    }

    fn visit_block_stmt(&mut self, block: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &block.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";

        string
    }

    fn visit_if_stmt(&mut self, r#if: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &r#if.condition.accept(self);
        string += " ";
        string += &r#if.then_branch.accept(self);
        if let Some(else_branch) = &r#if.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";

        string
    }

    fn visit_while_stmt(&mut self, r#while: &WhileData) -> String {
        parenthesize!(self, "while", r#while.condition, r#while.body)
    }

    fn visit_return_stmt(&mut self, r#return: &ReturnData) -> String {
        match &r#return.value {
            Some(value) => parenthesize!(self, "return", value),
            None => String::from("(return)"),
        }
    }

    fn visit_function_stmt(&mut self, function: &FunctionData) -> String {
        self.function(function)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{Token, Type};

    #[test]
    fn prints_nested_expressions() {
        let expr = Expr::Binary(BinaryData {
            left: Box::new(Expr::Unary(UnaryData {
                operator: Token::new(Type::Minus, String::from("-"), None, 1),
                expr: Box::new(Expr::Literal(Literal::Number(123.0))),
            })),
            operator: Token::new(Type::Star, String::from("*"), None, 1),
            right: Box::new(Expr::Grouping(GroupingData {
                expr: Box::new(Expr::Literal(Literal::Number(45.67))),
            })),
        });

        assert_eq!(ASTPrinter.print(&expr), "(* (- 123) (group 45.67))");
    }
}
