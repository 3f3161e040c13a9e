//! Variable read/write inspection

use super::cfg::ControlFlowGraph;
use indexmap::IndexSet;
use yolol_ast::{Statement, VariableName, Visit};

/// Names read and written by a set of statements, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableUsage {
    reads: IndexSet<VariableName>,
    writes: IndexSet<VariableName>,
}

impl VariableUsage {
    /// Usage across every block of `graph`
    pub fn of_graph(graph: &ControlFlowGraph) -> Self {
        let mut usage = Self::default();
        for block in graph.vertices() {
            for stmt in block.statements() {
                usage.visit_statement(stmt);
            }
        }
        usage
    }

    pub fn of_statements<'a>(stmts: impl IntoIterator<Item = &'a Statement>) -> Self {
        let mut usage = Self::default();
        for stmt in stmts {
            usage.visit_statement(stmt);
        }
        usage
    }

    pub fn reads(&self) -> impl Iterator<Item = &VariableName> {
        self.reads.iter()
    }

    pub fn writes(&self) -> impl Iterator<Item = &VariableName> {
        self.writes.iter()
    }

    pub fn is_read(&self, name: &str) -> bool {
        self.reads.iter().any(|read| read.name() == name)
    }

    pub fn is_written(&self, name: &str) -> bool {
        self.writes.iter().any(|write| write.name() == name)
    }

    /// Internal names that are read but never written. Reading such a
    /// name always yields its zero value.
    pub fn unwritten_reads(&self) -> impl Iterator<Item = &VariableName> {
        self.reads
            .iter()
            .filter(|name| !name.is_external() && !self.writes.contains(*name))
    }
}

impl<'ast> Visit<'ast> for VariableUsage {
    fn visit_variable_read(&mut self, name: &'ast VariableName) {
        self.reads.insert(name.clone());
    }

    fn visit_variable_write(&mut self, name: &'ast VariableName) {
        self.writes.insert(name.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yolol_ast::{BinaryOp, CompoundAssignment, CompoundOp, Expression, Marker};

    fn names<'a>(iter: impl Iterator<Item = &'a VariableName>) -> Vec<&'a str> {
        iter.map(VariableName::name).collect()
    }

    #[test]
    fn test_unwritten_reads() {
        let stmts = vec![
            Statement::assign(
                "a",
                Expression::binary(BinaryOp::Add, Expression::variable("b"), Expression::variable(":dev")),
            ),
            Statement::assign("c", Expression::variable("a")),
        ];
        let usage = VariableUsage::of_statements(&stmts);

        assert_eq!(names(usage.reads()), vec!["b", ":dev", "a"]);
        assert_eq!(names(usage.writes()), vec!["a", "c"]);
        // External fields are never defaulted
        assert_eq!(names(usage.unwritten_reads()), vec!["b"]);
    }

    #[test]
    fn test_branches_and_markers_are_inspected() {
        let stmts = vec![
            Statement::if_else(
                Expression::variable("cond"),
                vec![Statement::assign("x", Expression::number(1))],
                vec![Statement::CompoundAssignment(CompoundAssignment {
                    left: "y".into(),
                    op: CompoundOp::Add,
                    right: Expression::number(1),
                })],
            ),
            Statement::Marker(Marker::Conditional(Expression::variable("m"))),
        ];
        let usage = VariableUsage::of_statements(&stmts);

        assert!(usage.is_read("cond"));
        assert!(usage.is_read("m"));
        assert!(usage.is_written("x"));
        // Compound assignment both reads and writes its target
        assert!(usage.is_read("y") && usage.is_written("y"));
        assert_eq!(names(usage.unwritten_reads()), vec!["cond", "m"]);
    }
}
