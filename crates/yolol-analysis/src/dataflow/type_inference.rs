//! Expression type inference
//!
//! Infers the [`Type`] of an expression from the types currently known for
//! the variables it reads. Inference is pure: it never records anything and
//! can be repeated as more variables become known.

use super::lattice::TypeLattice;
use super::table::TypeLookup;
use yolol_ast::{BinaryOp, Expression, ExpressionVisitor, Number, Type, UnaryOp, VariableName};

/// Expression visitor computing a [`Type`] against a [`TypeLookup`]
pub struct ExpressionTypeInference<'a, L: TypeLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: TypeLookup + ?Sized> ExpressionTypeInference<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }
}

impl<L: TypeLookup + ?Sized> ExpressionVisitor for ExpressionTypeInference<'_, L> {
    type Output = Type;

    fn visit_constant_number(&mut self, _value: Number) -> Type {
        Type::NUMBER
    }

    fn visit_constant_string(&mut self, _value: &str) -> Type {
        Type::STRING
    }

    fn visit_variable(&mut self, name: &VariableName) -> Type {
        self.lookup.type_of(name.name()).unwrap_or(Type::UNASSIGNED)
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expression) -> Type {
        let operand = self.visit(operand);
        TypeLattice::unary_op_type(op, operand)
    }

    fn visit_binary(&mut self, op: BinaryOp, left: &Expression, right: &Expression) -> Type {
        let left_ty = self.visit(left);
        let right_ty = self.visit(right);
        TypeLattice::binary_op_type(op, left_ty, right_ty, is_nonzero_constant(right))
    }
}

fn is_nonzero_constant(expr: &Expression) -> bool {
    match expr {
        Expression::ConstantNumber(n) => !n.is_zero(),
        Expression::Bracketed(inner) => is_nonzero_constant(inner),
        _ => false,
    }
}

/// Infer the type of `expr`. Variables missing from `lookup` make the
/// result [`Type::UNASSIGNED`] rather than a guess.
pub fn infer_type<L: TypeLookup + ?Sized>(expr: &Expression, lookup: &L) -> Type {
    ExpressionTypeInference::new(lookup).visit(expr)
}
