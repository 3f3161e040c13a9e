//! Rewriting traversal over statements
//!
//! Each `fold_*` method of [`Fold`] has a default that rebuilds the node:
//! leaves are returned unchanged and composites (`StatementList`, `If`,
//! `Program`, `Line`) are rebuilt from their folded children. Implementors
//! override only the variants they transform and call the free function of
//! the same name to fall back to the default behaviour.
//!
//! Marker statements are outside the core variant set. They reach
//! [`Fold::fold_unknown`], which fails unless overridden.

use crate::ast::{
    Assignment, CompoundAssignment, Expression, If, Line, Marker, Program, Statement, StatementList,
    TypedAssignment,
};
use crate::VisitError;

pub trait Fold {
    type Error: From<VisitError>;

    fn fold_program(&mut self, program: &Program) -> Result<Program, Self::Error> {
        fold_program(self, program)
    }

    fn fold_line(&mut self, line: &Line) -> Result<Line, Self::Error> {
        fold_line(self, line)
    }

    fn fold_statement(&mut self, stmt: &Statement) -> Result<Statement, Self::Error> {
        fold_statement(self, stmt)
    }

    fn fold_statement_list(&mut self, list: &StatementList) -> Result<StatementList, Self::Error> {
        fold_statement_list(self, list)
    }

    fn fold_empty(&mut self) -> Result<Statement, Self::Error> {
        Ok(Statement::Empty)
    }

    fn fold_assignment(&mut self, assignment: &Assignment) -> Result<Statement, Self::Error> {
        Ok(Statement::Assignment(assignment.clone()))
    }

    fn fold_typed_assignment(&mut self, assignment: &TypedAssignment) -> Result<Statement, Self::Error> {
        Ok(Statement::TypedAssignment(assignment.clone()))
    }

    fn fold_compound_assignment(&mut self, assignment: &CompoundAssignment) -> Result<Statement, Self::Error> {
        Ok(Statement::CompoundAssignment(assignment.clone()))
    }

    fn fold_expression_wrapper(&mut self, expr: &Expression) -> Result<Statement, Self::Error> {
        Ok(Statement::ExpressionWrapper(expr.clone()))
    }

    fn fold_goto(&mut self, target: &Expression) -> Result<Statement, Self::Error> {
        Ok(Statement::Goto(target.clone()))
    }

    fn fold_if(&mut self, stmt: &If) -> Result<Statement, Self::Error> {
        fold_if(self, stmt)
    }

    fn fold_unknown(&mut self, marker: &Marker) -> Result<Statement, Self::Error> {
        Err(VisitError::UnhandledMarker {
            kind: marker.kind_name(),
        }
        .into())
    }
}

pub fn fold_program<F: Fold + ?Sized>(folder: &mut F, program: &Program) -> Result<Program, F::Error> {
    let lines = program
        .lines
        .iter()
        .map(|line| folder.fold_line(line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Program::new(lines))
}

pub fn fold_line<F: Fold + ?Sized>(folder: &mut F, line: &Line) -> Result<Line, F::Error> {
    Ok(Line::new(folder.fold_statement_list(&line.statements)?))
}

pub fn fold_statement_list<F: Fold + ?Sized>(folder: &mut F, list: &StatementList) -> Result<StatementList, F::Error> {
    list.iter().map(|stmt| folder.fold_statement(stmt)).collect()
}

pub fn fold_if<F: Fold + ?Sized>(folder: &mut F, stmt: &If) -> Result<Statement, F::Error> {
    let true_branch = folder.fold_statement_list(&stmt.true_branch)?;
    let false_branch = folder.fold_statement_list(&stmt.false_branch)?;
    Ok(Statement::If(If {
        condition: stmt.condition.clone(),
        true_branch,
        false_branch,
    }))
}

/// Dispatch a statement to the `fold_*` method for its variant
pub fn fold_statement<F: Fold + ?Sized>(folder: &mut F, stmt: &Statement) -> Result<Statement, F::Error> {
    match stmt {
        Statement::Empty => folder.fold_empty(),
        Statement::List(list) => Ok(Statement::List(folder.fold_statement_list(list)?)),
        Statement::Assignment(a) => folder.fold_assignment(a),
        Statement::TypedAssignment(a) => folder.fold_typed_assignment(a),
        Statement::CompoundAssignment(a) => folder.fold_compound_assignment(a),
        Statement::ExpressionWrapper(e) => folder.fold_expression_wrapper(e),
        Statement::Goto(e) => folder.fold_goto(e),
        Statement::If(i) => folder.fold_if(i),
        Statement::Marker(m) => folder.fold_unknown(m),
    }
}
