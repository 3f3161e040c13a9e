//! Operator typing rules over the [`Type`] flag set
//!
//! Results are computed per concrete operand kind and unioned, so a hinted
//! `number|string` operand yields the union of both rules. Operand error
//! flags carry over into the result.

use yolol_ast::{BinaryOp, Type, UnaryOp};

/// The operator rules
pub struct TypeLattice;

impl TypeLattice {
    /// Result type of a binary operation.
    ///
    /// `nonzero_divisor` is true when the right operand is a numeric
    /// constant other than zero, which rules out a division fault.
    pub fn binary_op_type(op: BinaryOp, left: Type, right: Type, nonzero_divisor: bool) -> Type {
        if left.is_unassigned() || right.is_unassigned() {
            return Type::UNASSIGNED;
        }

        let carried = if left.has_error() || right.has_error() {
            Type::ERROR
        } else {
            Type::UNASSIGNED
        };

        // Comparisons never fault on their own and never produce text
        if op.is_comparison() {
            return Type::NUMBER | carried;
        }

        let mut result = carried;
        let mut any_pair = false;
        for l in left.value_kinds() {
            for r in right.value_kinds() {
                result |= Self::binary_kind_rule(op, l, r, nonzero_divisor);
                any_pair = true;
            }
        }

        // An operand that can only fault makes the whole expression fault
        if !any_pair {
            result |= Type::ERROR;
        }
        result
    }

    /// Rule for a single pair of concrete kinds
    fn binary_kind_rule(op: BinaryOp, left: Type, right: Type, nonzero_divisor: bool) -> Type {
        let both_numbers = left == Type::NUMBER && right == Type::NUMBER;

        match op {
            // Defined on strings; a number operand is coerced to its text
            BinaryOp::Add | BinaryOp::Subtract => {
                if both_numbers {
                    Type::NUMBER
                } else {
                    Type::STRING
                }
            }
            BinaryOp::Multiply | BinaryOp::Exponent | BinaryOp::And | BinaryOp::Or => {
                if both_numbers {
                    Type::NUMBER
                } else {
                    Type::ERROR
                }
            }
            BinaryOp::Divide | BinaryOp::Modulo => match (both_numbers, nonzero_divisor) {
                (true, true) => Type::NUMBER,
                (true, false) => Type::NUMBER | Type::ERROR,
                (false, _) => Type::ERROR,
            },
            BinaryOp::EqualTo
            | BinaryOp::NotEqualTo
            | BinaryOp::LessThan
            | BinaryOp::GreaterThan
            | BinaryOp::LessThanEqualTo
            | BinaryOp::GreaterThanEqualTo => Type::NUMBER,
        }
    }

    /// Result type of a unary operation
    pub fn unary_op_type(op: UnaryOp, operand: Type) -> Type {
        if operand.is_unassigned() {
            return Type::UNASSIGNED;
        }

        let mut result = if operand.has_error() {
            Type::ERROR
        } else {
            Type::UNASSIGNED
        };

        if operand.contains(Type::NUMBER) {
            result |= match op {
                // Domain faults: negative roots, |x| > 1 for asin/acos
                UnaryOp::Sqrt | UnaryOp::ArcSine | UnaryOp::ArcCosine => Type::NUMBER | Type::ERROR,
                _ => Type::NUMBER,
            };
        }
        if operand.contains(Type::STRING) {
            result |= Type::ERROR;
        }
        result
    }
}
