//! Control flow graph model and builder
//!
//! Blocks live in an arena keyed by a stable [`BlockId`] and edges are
//! stored as `(start, end, kind)` triples, so rebuilding a graph preserves
//! identity by copying keys. A finished [`ControlFlowGraph`] is read-only;
//! new graphs are made with [`CfgBuilder`] or the transformations in
//! [`super::transform`].

use crate::error::{AnalysisError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use yolol_ast::Statement;

/// Unique identifier for a basic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Entry,
    Exit,
    /// First block of a source line
    LineStart,
    /// Block following a split inside a line
    Continue,
    Basic,
}

/// How control moves along an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Continue,
    ConditionalTrue,
    ConditionalFalse,
    GotoConstNumber,
    GotoConstString,
    GotoExpression,
    RuntimeError,
}

/// A basic block in the CFG
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    id: BlockId,
    kind: BlockKind,
    line_number: usize,
    statements: Vec<Statement>,
}

impl BasicBlock {
    fn new(id: BlockId, kind: BlockKind, line_number: usize) -> Self {
        Self {
            id,
            kind,
            line_number,
            statements: Vec::new(),
        }
    }

    /// Copy of this block's identity with no statements
    pub(crate) fn empty_clone(&self) -> Self {
        Self::new(self.id, self.kind, self.line_number)
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// Write access to a block under construction. Statements can only be
/// appended.
#[derive(Debug)]
pub struct BlockMut<'a> {
    block: &'a mut BasicBlock,
}

impl<'a> BlockMut<'a> {
    pub(crate) fn new(block: &'a mut BasicBlock) -> Self {
        Self { block }
    }

    pub fn push(&mut self, stmt: Statement) {
        self.block.statements.push(stmt);
    }

    pub fn extend(&mut self, stmts: impl IntoIterator<Item = Statement>) {
        self.block.statements.extend(stmts);
    }

    pub fn id(&self) -> BlockId {
        self.block.id
    }

    pub fn kind(&self) -> BlockKind {
        self.block.kind
    }

    pub fn line_number(&self) -> usize {
        self.block.line_number
    }

    pub fn statements(&self) -> &[Statement] {
        &self.block.statements
    }
}

/// Directed edge between two blocks of the same graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub(crate) start: BlockId,
    pub(crate) end: BlockId,
    pub(crate) kind: EdgeKind,
}

impl Edge {
    pub fn start(&self) -> BlockId {
        self.start
    }

    pub fn end(&self) -> BlockId {
        self.end
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }
}

/// Control Flow Graph
///
/// Invariant: both endpoints of every edge are blocks of the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ControlFlowGraph {
    pub(crate) blocks: IndexMap<BlockId, BasicBlock>,
    pub(crate) edges: Vec<Edge>,
}

impl ControlFlowGraph {
    /// Blocks in creation order
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = &BasicBlock> {
        self.blocks.values()
    }

    pub fn vertex(&self, id: BlockId) -> Result<&BasicBlock> {
        self.blocks.get(&id).ok_or(AnalysisError::VertexNotFound(id))
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn vertex_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn outgoing(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.start == id)
    }

    pub fn incoming(&self, id: BlockId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.end == id)
    }

    /// The first block of kind [`BlockKind::Entry`], if any
    pub fn entry_point(&self) -> Option<&BasicBlock> {
        self.vertices().find(|block| block.kind == BlockKind::Entry)
    }

    /// Blocks reachable from the entry point, in reverse postorder.
    /// Empty when the graph has no entry block.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let Some(entry) = self.entry_point() else {
            return Vec::new();
        };

        let mut successors: IndexMap<BlockId, Vec<BlockId>> = IndexMap::new();
        for edge in &self.edges {
            successors.entry(edge.start).or_default().push(edge.end);
        }

        let mut visited = IndexSet::new();
        let mut postorder = Vec::with_capacity(self.blocks.len());
        // (block, index of the next successor to explore)
        let mut stack = vec![(entry.id, 0usize)];
        visited.insert(entry.id);

        while let Some((block, next)) = stack.last_mut() {
            let succ = successors.get(&*block).and_then(|succs| succs.get(*next)).copied();
            match succ {
                Some(succ) => {
                    *next += 1;
                    if visited.insert(succ) {
                        stack.push((succ, 0));
                    }
                }
                None => {
                    postorder.push(*block);
                    stack.pop();
                }
            }
        }

        postorder.reverse();
        postorder
    }
}

/// Builder for constructing a [`ControlFlowGraph`]
#[derive(Debug, Default)]
pub struct CfgBuilder {
    graph: ControlFlowGraph,
    next_block_id: usize,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a block with a caller chosen id
    pub fn create_block(&mut self, kind: BlockKind, line_number: usize, id: BlockId) -> Result<BlockId> {
        if self.graph.blocks.contains_key(&id) {
            return Err(AnalysisError::DuplicateVertex(id));
        }
        self.graph.blocks.insert(id, BasicBlock::new(id, kind, line_number));
        self.next_block_id = self.next_block_id.max(id.0.saturating_add(1));
        Ok(id)
    }

    /// Create a block with a fresh id. Never reuses an id already in the graph.
    pub fn new_block(&mut self, kind: BlockKind, line_number: usize) -> BlockId {
        let id = self.fresh_id();
        self.next_block_id = self.next_block_id.max(id.0.saturating_add(1));
        self.graph.blocks.insert(id, BasicBlock::new(id, kind, line_number));
        id
    }

    fn fresh_id(&self) -> BlockId {
        let taken = |id: &usize| self.graph.blocks.contains_key(&BlockId(*id));
        // The counter saturates at `usize::MAX`; past that, fill the lowest gap
        std::iter::once(self.next_block_id)
            .chain(0..)
            .find(|id| !taken(id))
            .map_or(BlockId(self.next_block_id), BlockId)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Result<BlockMut<'_>> {
        self.graph
            .blocks
            .get_mut(&id)
            .map(BlockMut::new)
            .ok_or(AnalysisError::VertexNotFound(id))
    }

    pub fn add_stmt(&mut self, id: BlockId, stmt: Statement) -> Result<()> {
        self.block_mut(id)?.push(stmt);
        Ok(())
    }

    pub fn create_edge(&mut self, start: BlockId, end: BlockId, kind: EdgeKind) -> Result<()> {
        for id in [start, end] {
            if !self.graph.blocks.contains_key(&id) {
                return Err(AnalysisError::MissingVertex(id));
            }
        }
        self.graph.edges.push(Edge { start, end, kind });
        Ok(())
    }

    /// The graph built so far
    pub fn graph(&self) -> &ControlFlowGraph {
        &self.graph
    }

    pub fn build(self) -> ControlFlowGraph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yolol_ast::Expression;

    fn diamond() -> ControlFlowGraph {
        let mut builder = CfgBuilder::new();
        let entry = builder.new_block(BlockKind::Entry, 0);
        let left = builder.new_block(BlockKind::Basic, 1);
        let right = builder.new_block(BlockKind::Basic, 1);
        let exit = builder.new_block(BlockKind::Exit, 2);
        builder.create_edge(entry, left, EdgeKind::ConditionalTrue).unwrap();
        builder.create_edge(entry, right, EdgeKind::ConditionalFalse).unwrap();
        builder.create_edge(left, exit, EdgeKind::Continue).unwrap();
        builder.create_edge(right, exit, EdgeKind::Continue).unwrap();
        builder.build()
    }

    #[test]
    fn test_create_block_with_explicit_id() {
        let mut builder = CfgBuilder::new();
        builder.create_block(BlockKind::LineStart, 3, BlockId(10)).unwrap();
        builder
            .add_stmt(BlockId(10), Statement::assign("a", Expression::number(1)))
            .unwrap();

        // Fresh ids never collide with explicit ones
        let next = builder.new_block(BlockKind::Basic, 3);
        assert_eq!(next, BlockId(11));

        let graph = builder.build();
        let block = graph.vertex(BlockId(10)).unwrap();
        assert_eq!(block.kind(), BlockKind::LineStart);
        assert_eq!(block.line_number(), 3);
        assert_eq!(block.statements().len(), 1);
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let mut builder = CfgBuilder::new();
        builder.create_block(BlockKind::Basic, 1, BlockId(0)).unwrap();
        assert_eq!(
            builder.create_block(BlockKind::Basic, 1, BlockId(0)),
            Err(AnalysisError::DuplicateVertex(BlockId(0)))
        );
    }

    #[test]
    fn test_edge_to_missing_vertex() {
        let mut builder = CfgBuilder::new();
        let a = builder.new_block(BlockKind::Basic, 1);
        assert_eq!(
            builder.create_edge(a, BlockId(7), EdgeKind::Continue),
            Err(AnalysisError::MissingVertex(BlockId(7)))
        );
        assert_eq!(
            builder.create_edge(BlockId(9), a, EdgeKind::Continue),
            Err(AnalysisError::MissingVertex(BlockId(9)))
        );
        assert!(builder.graph().edges().is_empty());
    }

    #[test]
    fn test_vertex_not_found() {
        let graph = diamond();
        assert_eq!(graph.vertex(BlockId(99)), Err(AnalysisError::VertexNotFound(BlockId(99))));
    }

    #[test]
    fn test_outgoing_and_incoming() {
        let graph = diamond();
        assert_eq!(graph.outgoing(BlockId(0)).count(), 2);
        assert_eq!(graph.incoming(BlockId(3)).count(), 2);
        assert_eq!(graph.incoming(BlockId(0)).count(), 0);
    }

    #[test]
    fn test_reverse_postorder() {
        let graph = diamond();
        let rpo = graph.reverse_postorder();

        // Entry should come first in RPO, exit last
        assert_eq!(rpo.first(), Some(&BlockId(0)));
        assert_eq!(rpo.last(), Some(&BlockId(3)));
        assert_eq!(rpo.len(), 4);
    }

    #[test]
    fn test_reverse_postorder_with_loop() {
        let mut builder = CfgBuilder::new();
        let entry = builder.new_block(BlockKind::Entry, 0);
        let body = builder.new_block(BlockKind::LineStart, 1);
        builder.create_edge(entry, body, EdgeKind::Continue).unwrap();
        builder.create_edge(body, body, EdgeKind::GotoConstNumber).unwrap();
        let unreachable = builder.new_block(BlockKind::LineStart, 2);

        let rpo = builder.build().reverse_postorder();
        assert_eq!(rpo, vec![entry, body]);
        assert!(!rpo.contains(&unreachable));
    }

    #[test]
    fn test_reverse_postorder_long_chain() {
        const LENGTH: usize = 100_000;

        let mut builder = CfgBuilder::new();
        let entry = builder.new_block(BlockKind::Entry, 0);
        let mut tail = entry;
        for line in 1..LENGTH {
            let next = builder.new_block(BlockKind::Continue, line);
            builder.create_edge(tail, next, EdgeKind::Continue).unwrap();
            tail = next;
        }

        let rpo = builder.build().reverse_postorder();
        assert_eq!(rpo.len(), LENGTH);
        assert_eq!(rpo.first(), Some(&entry));
        assert_eq!(rpo.last(), Some(&tail));
    }

    #[test]
    fn test_new_block_after_max_id() {
        let mut builder = CfgBuilder::new();
        let exit = builder.create_block(BlockKind::Exit, 0, BlockId(usize::MAX)).unwrap();
        let first = builder.new_block(BlockKind::LineStart, 1);
        let second = builder.new_block(BlockKind::LineStart, 2);

        assert_ne!(first, exit);
        assert_ne!(second, exit);
        assert_ne!(first, second);

        let graph = builder.build();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.vertex(exit).unwrap().kind(), BlockKind::Exit);
        assert_eq!(graph.vertex(first).unwrap().line_number(), 1);
        assert_eq!(graph.vertex(second).unwrap().line_number(), 2);
    }

    #[test]
    fn test_new_block_skips_explicit_ids() {
        let mut builder = CfgBuilder::new();
        let first = builder.new_block(BlockKind::Entry, 0);
        builder.create_block(BlockKind::Basic, 1, BlockId(first.0 + 1)).unwrap();
        let next = builder.new_block(BlockKind::Basic, 2);

        assert_eq!(next, BlockId(first.0 + 2));
        assert_eq!(builder.build().vertex_count(), 3);
    }
}
