//! # Yolol AST
//!
//! Statement and expression tree for the Yolol scripting language, the
//! [`Type`] flag set used by static analysis, and the visitor framework
//! analyses are built on.
//!
//! ## Modules
//!
//! - **[`ast`]** - statements, expressions, programs
//! - **[`types`]** - value kinds, fixed point numbers, variable names
//! - **[`fold`]** - rewriting traversal ([`Fold`])
//! - **[`visit`]** - read-only traversals ([`Visit`], [`ExpressionVisitor`])

pub mod ast;
pub mod fold;
pub mod types;
pub mod visit;

pub use ast::{
    Assignment, BinaryOp, CompoundAssignment, CompoundOp, Expression, If, Line, Marker, Program, Statement,
    StatementList, TypedAssignment, UnaryOp,
};
pub use fold::Fold;
pub use types::{Number, ParseTypeError, Type, VariableName};
pub use visit::{ExpressionVisitor, Visit};

/// Failure raised by the default traversal behaviour
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisitError {
    /// A marker statement reached a folder that does not handle it
    #[error("no rewrite rule for `{kind}` marker statement")]
    UnhandledMarker { kind: &'static str },
}
