//! # Yolol Analysis
//!
//! Control flow graphs and static flow typing for Yolol programs.
//!
//! ## Modules
//!
//! - **[`dataflow`]** - graph model, transformations, type inference and the
//!   flow typing engine
//! - **[`config`]** - flow typing configuration
//! - **[`error`]** - analysis errors
//!
//! ## Quick Start
//!
//! ```rust
//! use yolol_analysis::prelude::*;
//!
//! let mut builder = CfgBuilder::new();
//! let entry = builder.new_block(BlockKind::Entry, 0);
//! let line = builder.new_block(BlockKind::LineStart, 1);
//! builder.create_edge(entry, line, EdgeKind::Continue).unwrap();
//! builder
//!     .add_stmt(line, Statement::assign("greeting", Expression::variable(":name")))
//!     .unwrap();
//!
//! let typing = FlowTyper::new()
//!     .with_hint(":name", Type::STRING)
//!     .run(&builder.build())
//!     .unwrap();
//! assert_eq!(typing.type_of("greeting"), Some(Type::STRING));
//! assert!(typing.indeterminate().is_empty());
//! ```

pub mod config;
pub mod dataflow;
pub mod error;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{FlowTypingConfig, TypeHint};
    pub use crate::dataflow::{
        flow_typing, infer_type, typing_pass, BasicBlock, BlockId, BlockKind, BlockMut, CfgBuilder, ControlFlowGraph,
        Edge, EdgeConnector, EdgeKind, FlowTyper, FlowTyping, PassProgress, TypeAssignmentTable, TypeLookup,
        VariableUsage,
    };
    pub use crate::error::{AnalysisError, Result};
    pub use yolol_ast::{BinaryOp, Expression, Statement, Type, TypedAssignment, UnaryOp, VariableName};
}

pub use config::{FlowTypingConfig, TypeHint};
pub use dataflow::{flow_typing, CfgBuilder, ControlFlowGraph, FlowTyper, FlowTyping, TypeAssignmentTable};
pub use error::{AnalysisError, Result};
