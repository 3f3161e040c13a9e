//! Control flow graphs and flow typing
//!
//! This module implements:
//! - Control flow graph model and builder
//! - Non-mutating graph transformations that preserve block identity
//! - Variable usage inspection
//! - Operator typing rules and expression type inference
//! - Fixed point flow typing over SSA graphs

mod cfg;
mod lattice;
mod solver;
mod table;
mod transform;
mod type_inference;
mod usage;

pub use cfg::{BasicBlock, BlockId, BlockKind, BlockMut, CfgBuilder, ControlFlowGraph, Edge, EdgeKind};
pub use lattice::TypeLattice;
pub use solver::{flow_typing, typing_pass, FlowTyper, FlowTyping, PassProgress};
pub use table::{TypeAssignmentTable, TypeLookup};
pub use transform::EdgeConnector;
pub use type_inference::{infer_type, ExpressionTypeInference};
pub use usage::VariableUsage;
