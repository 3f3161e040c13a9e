//! Graph transformations
//!
//! Every transformation reads an input graph and builds a new one; the
//! input is never changed. Blocks that survive keep their id, kind and
//! line number.

use super::cfg::{BasicBlock, BlockId, BlockMut, ControlFlowGraph, Edge, EdgeKind};
use crate::error::{AnalysisError, Result};
use indexmap::IndexMap;
use tracing::debug;
use yolol_ast::{Fold, Program};

/// Connects blocks of a graph being rebuilt by [`ControlFlowGraph::modify_edges`]
#[derive(Debug)]
pub struct EdgeConnector<'a> {
    graph: &'a mut ControlFlowGraph,
}

impl EdgeConnector<'_> {
    pub fn connect(&mut self, start: BlockId, end: BlockId, kind: EdgeKind) -> Result<()> {
        for id in [start, end] {
            if !self.graph.contains(id) {
                return Err(AnalysisError::MissingVertex(id));
            }
        }
        self.graph.edges.push(Edge { start, end, kind });
        Ok(())
    }
}

impl ControlFlowGraph {
    /// Copy the blocks accepted by `keep`, with or without their statements
    fn clone_vertices<K>(&self, mut keep: K, with_statements: bool) -> IndexMap<BlockId, BasicBlock>
    where
        K: FnMut(&BasicBlock) -> bool,
    {
        self.blocks
            .values()
            .filter(|block| keep(*block))
            .map(|block| {
                let copy = if with_statements { block.clone() } else { block.empty_clone() };
                (block.id(), copy)
            })
            .collect()
    }

    /// Copy the edges accepted by `keep` whose endpoints both survived
    fn clone_edges<K>(&self, blocks: &IndexMap<BlockId, BasicBlock>, mut keep: K) -> Vec<Edge>
    where
        K: FnMut(&Edge) -> bool,
    {
        self.edges
            .iter()
            .filter(|edge| blocks.contains_key(&edge.start()) && blocks.contains_key(&edge.end()))
            .filter(|edge| keep(*edge))
            .copied()
            .collect()
    }

    /// Remove the blocks rejected by `keep`, and every edge touching them
    pub fn trim_vertices<K>(&self, keep: K) -> ControlFlowGraph
    where
        K: FnMut(&BasicBlock) -> bool,
    {
        let blocks = self.clone_vertices(keep, true);
        let edges = self.clone_edges(&blocks, |_| true);
        debug!(
            "trimmed {} of {} blocks",
            self.vertex_count() - blocks.len(),
            self.vertex_count()
        );
        ControlFlowGraph { blocks, edges }
    }

    /// Remove the edges rejected by `keep`; all blocks are kept
    pub fn trim_edges<K>(&self, keep: K) -> ControlFlowGraph
    where
        K: FnMut(&Edge) -> bool,
    {
        let blocks = self.clone_vertices(|_| true, true);
        let edges = self.clone_edges(&blocks, keep);
        debug!("trimmed {} of {} edges", self.edges.len() - edges.len(), self.edges.len());
        ControlFlowGraph { blocks, edges }
    }

    /// Rebuild every block through `rewrite`.
    ///
    /// The output topology (all blocks, all edges) is complete before the
    /// first call. Each call receives the original block and its empty
    /// replacement; statements appended to the replacement form the new
    /// block. A rewrite sees other blocks only in their original state.
    pub fn modify_vertices<F>(&self, mut rewrite: F) -> Result<ControlFlowGraph>
    where
        F: FnMut(&BasicBlock, &mut BlockMut<'_>) -> Result<()>,
    {
        let blocks = self.clone_vertices(|_| true, false);
        let edges = self.clone_edges(&blocks, |_| true);
        let mut output = ControlFlowGraph { blocks, edges };

        for original in self.vertices() {
            let target = output
                .blocks
                .get_mut(&original.id())
                .ok_or(AnalysisError::VertexNotFound(original.id()))?;
            rewrite(original, &mut BlockMut::new(target))?;
        }

        Ok(output)
    }

    /// Rebuild every edge through `rewrite`.
    ///
    /// All blocks are copied unchanged. For each original edge the callback
    /// may connect any number of edges (none drops it, several duplicate it).
    pub fn modify_edges<F>(&self, mut rewrite: F) -> Result<ControlFlowGraph>
    where
        F: FnMut(&Edge, &mut EdgeConnector<'_>) -> Result<()>,
    {
        let blocks = self.clone_vertices(|_| true, true);
        let mut output = ControlFlowGraph {
            blocks,
            edges: Vec::new(),
        };

        let mut connector = EdgeConnector { graph: &mut output };
        for edge in &self.edges {
            rewrite(edge, &mut connector)?;
        }

        debug!("rewrote {} edges into {}", self.edges.len(), output.edges.len());
        Ok(output)
    }

    /// Copy the graph and add `extra` edges between existing blocks
    pub fn add_edges<I>(&self, extra: I) -> Result<ControlFlowGraph>
    where
        I: IntoIterator<Item = (BlockId, BlockId, EdgeKind)>,
    {
        let mut output = self.clone();
        for (start, end, kind) in extra {
            self.vertex(start)?;
            self.vertex(end)?;
            output.edges.push(Edge { start, end, kind });
        }
        Ok(output)
    }

    /// Run a fresh folder from `factory` over each block.
    ///
    /// The block's statements are wrapped as a one-line [`Program`]; the
    /// folded program must still have exactly one line, whose statements
    /// become the new block.
    pub fn visit_blocks<V, F>(&self, mut factory: F) -> Result<ControlFlowGraph>
    where
        V: Fold,
        AnalysisError: From<V::Error>,
        F: FnMut() -> V,
    {
        self.modify_vertices(|original, target| {
            let program = Program::single_line(original.statements().to_vec());
            let visited = factory().fold_program(&program)?;

            if visited.lines.len() != 1 {
                return Err(AnalysisError::MalformedRewrite {
                    block: original.id(),
                    lines: visited.lines.len(),
                });
            }
            for line in visited.lines {
                target.extend(line.statements);
            }
            Ok(())
        })
    }

    /// Like [`visit_blocks`](Self::visit_blocks), with a `prepare` step run
    /// once over the whole input graph whose result each folder is built from
    pub fn visit_blocks_with<P, V, F, Prep>(&self, prepare: Prep, mut factory: F) -> Result<ControlFlowGraph>
    where
        Prep: FnOnce(&ControlFlowGraph) -> P,
        V: Fold,
        AnalysisError: From<V::Error>,
        F: FnMut(&P) -> V,
    {
        let prepared = prepare(self);
        self.visit_blocks(|| factory(&prepared))
    }
}
