//! Error types for graph construction, transformation and flow typing

use crate::dataflow::BlockId;
use yolol_ast::{Type, VisitError};

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

/// Misuse of the analysis API or input that violates its preconditions.
///
/// Indeterminate or invalid *types* are not errors; they are reported as
/// [`Type::UNASSIGNED`] and [`Type::ERROR`] values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("edge endpoint {0} is not a block of this graph")]
    MissingVertex(BlockId),

    #[error("no block with id {0}")]
    VertexNotFound(BlockId),

    #[error("a block with id {0} already exists")]
    DuplicateVertex(BlockId),

    /// Two write sites for one name: the graph is not in SSA form
    #[error("type already assigned to `{name}` ({existing}), cannot assign {attempted}")]
    DuplicateTypeAssignment {
        name: String,
        existing: Type,
        attempted: Type,
    },

    #[error("cannot flow type a {kind}: {remedy}")]
    UnsupportedStatement {
        kind: &'static str,
        remedy: &'static str,
    },

    #[error("rewriting block {block} produced {lines} lines, expected exactly one")]
    MalformedRewrite { block: BlockId, lines: usize },

    #[error("flow typing still changing after {0} passes")]
    PassLimitExceeded(usize),

    #[error(transparent)]
    Visit(#[from] VisitError),
}
