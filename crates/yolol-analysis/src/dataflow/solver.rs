//! Flow typing: fixed point type propagation over an SSA control flow graph
//!
//! A run seeds a fresh [`TypeAssignmentTable`] with the caller's hints,
//! defaults every internal variable that is read but never written to the
//! configured default type, then rewrites the graph pass after pass. Each
//! pass annotates the assignments whose right hand side can now be typed.
//! Iteration stops once a pass learns nothing new about any variable.
//!
//! The table is write-once and the number of written names is finite, so
//! the loop always terminates.

use super::cfg::ControlFlowGraph;
use super::table::{TypeAssignmentTable, TypeLookup};
use super::type_inference::infer_type;
use super::usage::VariableUsage;
use crate::config::{FlowTypingConfig, TypeHint};
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use tracing::{debug, trace};
use yolol_ast::{
    Assignment, CompoundAssignment, Expression, Fold, Marker, Statement, Type, TypedAssignment, VariableName, Visit,
};

/// Flow typing engine
///
/// # Example
///
/// ```
/// use yolol_analysis::prelude::*;
///
/// let mut builder = CfgBuilder::new();
/// let line = builder.new_block(BlockKind::LineStart, 1);
/// builder.add_stmt(line, Statement::assign("a", Expression::string("x"))).unwrap();
/// builder
///     .add_stmt(
///         line,
///         Statement::assign(
///             "b",
///             Expression::binary(BinaryOp::Add, Expression::variable("a"), Expression::number(2)),
///         ),
///     )
///     .unwrap();
///
/// let typing = FlowTyper::new().run(&builder.build()).unwrap();
/// assert_eq!(typing.type_of("b"), Some(Type::STRING));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowTyper {
    config: FlowTypingConfig,
}

impl FlowTyper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FlowTypingConfig) -> Self {
        Self { config }
    }

    /// Add a type for a variable the program reads but does not write
    pub fn with_hint(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.config.hints.push(TypeHint::new(name, ty));
        self
    }

    pub fn config(&self) -> &FlowTypingConfig {
        &self.config
    }

    /// Type every assignment in `graph` that can be typed.
    ///
    /// Fails on a second write to an already typed name, on a compound
    /// assignment or expression statement, and when `max_passes` is
    /// configured and exceeded.
    pub fn run(&self, graph: &ControlFlowGraph) -> Result<FlowTyping> {
        let mut types = self.seed(graph)?;
        let mut pass_modifications = Vec::new();
        let mut current: Option<ControlFlowGraph> = None;

        loop {
            if let Some(limit) = self.config.max_passes {
                if pass_modifications.len() >= limit {
                    return Err(AnalysisError::PassLimitExceeded(limit));
                }
            }

            let (output, progress) = typing_pass(current.as_ref().unwrap_or(graph), &mut types)?;
            pass_modifications.push(progress.modified);
            debug!(
                "flow typing pass {}: {} modified, {} types known",
                pass_modifications.len(),
                progress.modified,
                types.len()
            );

            if !progress.changed() {
                return Ok(FlowTyping {
                    graph: output,
                    types,
                    pass_modifications,
                });
            }
            current = Some(output);
        }
    }

    /// The table a run starts from: the hints, then the default type for
    /// every unwritten read that has no hint.
    pub fn seed(&self, graph: &ControlFlowGraph) -> Result<TypeAssignmentTable> {
        let mut types = TypeAssignmentTable::new();
        for hint in &self.config.hints {
            types.assign(&hint.name, hint.ty)?;
        }
        self.apply_defaults(graph, &mut types)?;
        Ok(types)
    }

    /// Reading a variable nothing writes yields its zero value
    fn apply_defaults(&self, graph: &ControlFlowGraph, types: &mut TypeAssignmentTable) -> Result<()> {
        let usage = VariableUsage::of_graph(graph);
        for name in usage.unwritten_reads() {
            if types.contains(name.name()) {
                continue;
            }
            trace!("defaulting unwritten variable `{}` to {}", name, self.config.default_type);
            types.assign(name.name(), self.config.default_type)?;
        }
        Ok(())
    }
}

/// Run flow typing with the default configuration and the given hints
pub fn flow_typing<'a, I>(graph: &ControlFlowGraph, hints: I) -> Result<FlowTyping>
where
    I: IntoIterator<Item = (&'a str, Type)>,
{
    hints
        .into_iter()
        .fold(FlowTyper::new(), |typer, (name, ty)| typer.with_hint(name, ty))
        .run(graph)
}

/// What a single [`typing_pass`] changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassProgress {
    modified: usize,
    recorded: usize,
}

impl PassProgress {
    /// Statements rewritten into typed assignments
    pub fn modified(&self) -> usize {
        self.modified
    }

    /// Table entries added for statements that were already typed
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Whether another pass could learn more
    pub fn changed(&self) -> bool {
        self.modified > 0 || self.recorded > 0
    }
}

/// One rewrite of every block, with a fresh folder per block.
///
/// Entries already in `types` are never changed; the pass only adds the
/// names it can newly type.
pub fn typing_pass(graph: &ControlFlowGraph, types: &mut TypeAssignmentTable) -> Result<(ControlFlowGraph, PassProgress)> {
    let mut progress = PassProgress::default();

    let output = graph.modify_vertices(|original, target| {
        let mut folder = AssignTypes::new(&mut *types);
        for stmt in original.statements() {
            target.push(folder.fold_statement(stmt)?);
        }
        progress.modified += folder.modified;
        progress.recorded += folder.recorded;
        Ok(())
    })?;

    Ok((output, progress))
}

/// Annotates assignments with their inferred type
struct AssignTypes<'a> {
    types: &'a mut TypeAssignmentTable,
    modified: usize,
    /// Entries added for assignments that were already correctly typed
    recorded: usize,
}

impl<'a> AssignTypes<'a> {
    fn new(types: &'a mut TypeAssignmentTable) -> Self {
        Self {
            types,
            modified: 0,
            recorded: 0,
        }
    }

    fn infer(&self, expr: &Expression) -> Type {
        infer_type(expr, &*self.types)
    }

    /// Record a newly determined type and build the annotated statement
    fn annotate(&mut self, ty: Type, left: &VariableName, right: &Expression) -> Result<Statement> {
        self.types.assign(left.name(), ty)?;
        self.modified += 1;
        trace!("typed `{}` as {}", left, ty);
        Ok(Statement::TypedAssignment(TypedAssignment::new(ty, left.clone(), right.clone())))
    }
}

impl Fold for AssignTypes<'_> {
    type Error = AnalysisError;

    fn fold_assignment(&mut self, assignment: &Assignment) -> Result<Statement> {
        let ty = self.infer(&assignment.right);
        if ty.is_unassigned() {
            return Ok(Statement::Assignment(assignment.clone()));
        }
        self.annotate(ty, &assignment.left, &assignment.right)
    }

    fn fold_typed_assignment(&mut self, assignment: &TypedAssignment) -> Result<Statement> {
        let ty = self.infer(&assignment.right);
        if ty.is_unassigned() {
            return Ok(Statement::TypedAssignment(assignment.clone()));
        }

        if ty == assignment.ty {
            if !self.types.contains(assignment.left.name()) {
                self.types.assign(assignment.left.name(), ty)?;
                self.recorded += 1;
            }
            return Ok(Statement::TypedAssignment(assignment.clone()));
        }

        self.annotate(ty, &assignment.left, &assignment.right)
    }

    fn fold_compound_assignment(&mut self, _assignment: &CompoundAssignment) -> Result<Statement> {
        Err(AnalysisError::UnsupportedStatement {
            kind: "compound assignment",
            remedy: "desugar `a op= b` into `a = a op b` before flow typing",
        })
    }

    fn fold_expression_wrapper(&mut self, _expr: &Expression) -> Result<Statement> {
        Err(AnalysisError::UnsupportedStatement {
            kind: "expression statement",
            remedy: "lower expression statements into assignments before flow typing",
        })
    }

    fn fold_unknown(&mut self, marker: &Marker) -> Result<Statement> {
        Ok(Statement::Marker(marker.clone()))
    }
}

/// Outcome of a flow typing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowTyping {
    graph: ControlFlowGraph,
    types: TypeAssignmentTable,
    pass_modifications: Vec<usize>,
}

impl FlowTyping {
    /// The rewritten graph
    pub fn graph(&self) -> &ControlFlowGraph {
        &self.graph
    }

    pub fn types(&self) -> &TypeAssignmentTable {
        &self.types
    }

    pub fn type_of(&self, name: &str) -> Option<Type> {
        self.types.type_of(name)
    }

    /// Modifications made by each pass, in order. The last entry belongs
    /// to the pass that reached the fixed point.
    pub fn passes(&self) -> &[usize] {
        &self.pass_modifications
    }

    pub fn into_parts(self) -> (ControlFlowGraph, TypeAssignmentTable) {
        (self.graph, self.types)
    }

    /// Names whose assignment could not be typed with the information
    /// available, in block order
    pub fn indeterminate(&self) -> Vec<&VariableName> {
        let assignments = AssignmentCollector::of_graph(&self.graph);
        assignments.untyped.into_iter().map(|a| &a.left).collect()
    }

    /// Typed assignments whose value may be a runtime fault
    pub fn type_errors(&self) -> Vec<&TypedAssignment> {
        let assignments = AssignmentCollector::of_graph(&self.graph);
        assignments.typed.into_iter().filter(|a| a.ty.has_error()).collect()
    }
}

#[derive(Default)]
struct AssignmentCollector<'ast> {
    untyped: Vec<&'ast Assignment>,
    typed: Vec<&'ast TypedAssignment>,
}

impl<'ast> AssignmentCollector<'ast> {
    fn of_graph(graph: &'ast ControlFlowGraph) -> Self {
        let mut collector = Self::default();
        for block in graph.vertices() {
            for stmt in block.statements() {
                collector.visit_statement(stmt);
            }
        }
        collector
    }
}

impl<'ast> Visit<'ast> for AssignmentCollector<'ast> {
    fn visit_assignment(&mut self, assignment: &'ast Assignment) {
        self.untyped.push(assignment);
    }

    fn visit_typed_assignment(&mut self, assignment: &'ast TypedAssignment) {
        self.typed.push(assignment);
    }
}
