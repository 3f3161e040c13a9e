//! Read-only traversals
//!
//! [`Visit`] walks statements and expressions without producing anything,
//! reporting every variable read and write on the way. [`ExpressionVisitor`]
//! maps an expression to a value, one method per expression variant.

use crate::ast::{
    Assignment, BinaryOp, CompoundAssignment, Expression, If, Marker, Statement, StatementList, TypedAssignment,
    UnaryOp,
};
use crate::types::{Number, VariableName};

pub trait Visit<'ast> {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        visit_statement(self, stmt)
    }

    fn visit_statement_list(&mut self, list: &'ast StatementList) {
        for stmt in list {
            self.visit_statement(stmt);
        }
    }

    fn visit_assignment(&mut self, assignment: &'ast Assignment) {
        self.visit_expression(&assignment.right);
        self.visit_variable_write(&assignment.left);
    }

    fn visit_typed_assignment(&mut self, assignment: &'ast TypedAssignment) {
        self.visit_expression(&assignment.right);
        self.visit_variable_write(&assignment.left);
    }

    /// `a += b` reads `a` before writing it
    fn visit_compound_assignment(&mut self, assignment: &'ast CompoundAssignment) {
        self.visit_variable_read(&assignment.left);
        self.visit_expression(&assignment.right);
        self.visit_variable_write(&assignment.left);
    }

    fn visit_if(&mut self, stmt: &'ast If) {
        self.visit_expression(&stmt.condition);
        self.visit_statement_list(&stmt.true_branch);
        self.visit_statement_list(&stmt.false_branch);
    }

    fn visit_marker(&mut self, marker: &'ast Marker) {
        match marker {
            Marker::Conditional(condition) => self.visit_expression(condition),
        }
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        visit_expression(self, expr)
    }

    fn visit_variable_read(&mut self, _name: &'ast VariableName) {}

    fn visit_variable_write(&mut self, _name: &'ast VariableName) {}
}

pub fn visit_statement<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Statement) {
    match stmt {
        Statement::Empty => {}
        Statement::List(list) => visitor.visit_statement_list(list),
        Statement::Assignment(a) => visitor.visit_assignment(a),
        Statement::TypedAssignment(a) => visitor.visit_typed_assignment(a),
        Statement::CompoundAssignment(a) => visitor.visit_compound_assignment(a),
        Statement::ExpressionWrapper(e) | Statement::Goto(e) => visitor.visit_expression(e),
        Statement::If(i) => visitor.visit_if(i),
        Statement::Marker(m) => visitor.visit_marker(m),
    }
}

pub fn visit_expression<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expression) {
    match expr {
        Expression::ConstantNumber(_) | Expression::ConstantString(_) => {}
        Expression::Variable(name) => visitor.visit_variable_read(name),
        Expression::Bracketed(inner) => visitor.visit_expression(inner),
        Expression::Unary { operand, .. } => visitor.visit_expression(operand),
        Expression::Binary { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
    }
}

/// Maps an expression to a value by dispatching on its variant
pub trait ExpressionVisitor {
    type Output;

    fn visit(&mut self, expr: &Expression) -> Self::Output {
        match expr {
            Expression::ConstantNumber(n) => self.visit_constant_number(*n),
            Expression::ConstantString(s) => self.visit_constant_string(s),
            Expression::Variable(name) => self.visit_variable(name),
            Expression::Bracketed(inner) => self.visit_bracketed(inner),
            Expression::Unary { op, operand } => self.visit_unary(*op, operand),
            Expression::Binary { op, left, right } => self.visit_binary(*op, left, right),
        }
    }

    fn visit_constant_number(&mut self, value: Number) -> Self::Output;

    fn visit_constant_string(&mut self, value: &str) -> Self::Output;

    fn visit_variable(&mut self, name: &VariableName) -> Self::Output;

    fn visit_bracketed(&mut self, inner: &Expression) -> Self::Output {
        self.visit(inner)
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expression) -> Self::Output;

    fn visit_binary(&mut self, op: BinaryOp, left: &Expression, right: &Expression) -> Self::Output;
}
