//! Statement and expression tree
//!
//! Statements are immutable values: passes produce new statements rather
//! than editing existing ones.

use crate::types::{Number, Type, VariableName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Not,
    Abs,
    Sqrt,
    Sine,
    Cosine,
    Tangent,
    ArcSine,
    ArcCosine,
    ArcTangent,
}

impl UnaryOp {
    pub fn keyword(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "not ",
            UnaryOp::Abs => "abs ",
            UnaryOp::Sqrt => "sqrt ",
            UnaryOp::Sine => "sin ",
            UnaryOp::Cosine => "cos ",
            UnaryOp::Tangent => "tan ",
            UnaryOp::ArcSine => "asin ",
            UnaryOp::ArcCosine => "acos ",
            UnaryOp::ArcTangent => "atan ",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    EqualTo,
    NotEqualTo,
    LessThan,
    GreaterThan,
    LessThanEqualTo,
    GreaterThanEqualTo,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Exponent => "^",
            BinaryOp::EqualTo => "==",
            BinaryOp::NotEqualTo => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThanEqualTo => "<=",
            BinaryOp::GreaterThanEqualTo => ">=",
            BinaryOp::And => " and ",
            BinaryOp::Or => " or ",
        }
    }

    /// Relational and equality operators, which always produce 0 or 1
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::EqualTo
                | BinaryOp::NotEqualTo
                | BinaryOp::LessThan
                | BinaryOp::GreaterThan
                | BinaryOp::LessThanEqualTo
                | BinaryOp::GreaterThanEqualTo
        )
    }
}

/// An expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expression {
    ConstantNumber(Number),
    ConstantString(String),
    Variable(VariableName),
    Bracketed(Box<Expression>),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn number(value: impl Into<Number>) -> Self {
        Expression::ConstantNumber(value.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::ConstantString(value.into())
    }

    pub fn variable(name: impl Into<VariableName>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn bracketed(inner: Expression) -> Self {
        Expression::Bracketed(Box::new(inner))
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::ConstantNumber(n) => write!(f, "{n}"),
            Expression::ConstantString(s) => write!(f, "\"{s}\""),
            Expression::Variable(name) => write!(f, "{name}"),
            Expression::Bracketed(inner) => write!(f, "({inner})"),
            Expression::Unary { op, operand } => write!(f, "{}{operand}", op.keyword()),
            Expression::Binary { op, left, right } => write!(f, "{left}{}{right}", op.symbol()),
        }
    }
}

/// Operator of a compound assignment (`a += b`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompoundOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl CompoundOp {
    pub fn binary_op(self) -> BinaryOp {
        match self {
            CompoundOp::Add => BinaryOp::Add,
            CompoundOp::Subtract => BinaryOp::Subtract,
            CompoundOp::Multiply => BinaryOp::Multiply,
            CompoundOp::Divide => BinaryOp::Divide,
            CompoundOp::Modulo => BinaryOp::Modulo,
        }
    }
}

/// Ordered sequence of statements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatementList {
    pub statements: Vec<Statement>,
}

impl StatementList {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl FromIterator<Statement> for StatementList {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for StatementList {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatementList {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl fmt::Display for StatementList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{stmt}")?;
        }
        Ok(())
    }
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub left: VariableName,
    pub right: Expression,
}

impl Assignment {
    pub fn new(left: impl Into<VariableName>, right: Expression) -> Self {
        Self {
            left: left.into(),
            right,
        }
    }
}

/// An assignment whose right hand side has a resolved type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedAssignment {
    pub ty: Type,
    pub left: VariableName,
    pub right: Expression,
}

impl TypedAssignment {
    pub fn new(ty: Type, left: impl Into<VariableName>, right: Expression) -> Self {
        Self {
            ty,
            left: left.into(),
            right,
        }
    }

    pub fn from_assignment(ty: Type, assignment: &Assignment) -> Self {
        Self {
            ty,
            left: assignment.left.clone(),
            right: assignment.right.clone(),
        }
    }

    /// The same write with its type annotation removed
    pub fn untyped(&self) -> Assignment {
        Assignment {
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

/// `name op= expression`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompoundAssignment {
    pub left: VariableName,
    pub op: CompoundOp,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct If {
    pub condition: Expression,
    pub true_branch: StatementList,
    pub false_branch: StatementList,
}

/// Statements that only exist inside control flow graphs and have no
/// surface syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Marker {
    /// Branch test closing a block; the outgoing edges carry the outcome
    Conditional(Expression),
}

impl Marker {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Marker::Conditional(_) => "conditional",
        }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    Empty,
    List(StatementList),
    Assignment(Assignment),
    TypedAssignment(TypedAssignment),
    CompoundAssignment(CompoundAssignment),
    ExpressionWrapper(Expression),
    Goto(Expression),
    If(If),
    Marker(Marker),
}

impl Statement {
    pub fn assign(left: impl Into<VariableName>, right: Expression) -> Self {
        Statement::Assignment(Assignment::new(left, right))
    }

    pub fn if_else(condition: Expression, true_branch: Vec<Statement>, false_branch: Vec<Statement>) -> Self {
        Statement::If(If {
            condition,
            true_branch: StatementList::new(true_branch),
            false_branch: StatementList::new(false_branch),
        })
    }

    /// Short name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Empty => "empty statement",
            Statement::List(_) => "statement list",
            Statement::Assignment(_) => "assignment",
            Statement::TypedAssignment(_) => "typed assignment",
            Statement::CompoundAssignment(_) => "compound assignment",
            Statement::ExpressionWrapper(_) => "expression statement",
            Statement::Goto(_) => "goto",
            Statement::If(_) => "if",
            Statement::Marker(marker) => marker.kind_name(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Empty => Ok(()),
            Statement::List(list) => write!(f, "{list}"),
            Statement::Assignment(a) => write!(f, "{}={}", a.left, a.right),
            Statement::TypedAssignment(a) => write!(f, "{}:{}={}", a.left, a.ty, a.right),
            Statement::CompoundAssignment(a) => {
                write!(f, "{}{}={}", a.left, a.op.binary_op().symbol(), a.right)
            }
            Statement::ExpressionWrapper(e) => write!(f, "{e}"),
            Statement::Goto(e) => write!(f, "goto {e}"),
            Statement::If(i) => {
                write!(f, "if {} then {}", i.condition, i.true_branch)?;
                if !i.false_branch.is_empty() {
                    write!(f, " else {}", i.false_branch)?;
                }
                f.write_str(" end")
            }
            Statement::Marker(Marker::Conditional(e)) => write!(f, "<branch {e}>"),
        }
    }
}

/// One source line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Line {
    pub statements: StatementList,
}

impl Line {
    pub fn new(statements: StatementList) -> Self {
        Self { statements }
    }
}

/// A whole program; also the unit a single block is wrapped in for rewriting
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Program {
    pub lines: Vec<Line>,
}

impl Program {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Wrap a statement sequence as a program of exactly one line
    pub fn single_line(statements: Vec<Statement>) -> Self {
        Self::new(vec![Line::new(StatementList::new(statements))])
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", line.statements)?;
        }
        Ok(())
    }
}
