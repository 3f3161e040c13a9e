//! Property tests for graph transformations and flow typing
//!
//! Key properties:
//!
//! 1. Trimming with an always-true predicate is the identity
//! 2. Modifying every block with a statement copy is the identity
//! 3. Edge-only trims keep every block
//! 4. Flow typing an already typed graph modifies nothing
//! 5. Every typed assignment agrees with the final table
//! 6. A pass only adds table entries, never changes or drops one

use proptest::prelude::*;
use yolol_analysis::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const OPS: &[BinaryOp] = &[
    BinaryOp::Add,
    BinaryOp::Subtract,
    BinaryOp::Multiply,
    BinaryOp::Divide,
    BinaryOp::Modulo,
    BinaryOp::EqualTo,
    BinaryOp::LessThan,
    BinaryOp::And,
];

const EDGE_KINDS: &[EdgeKind] = &[
    EdgeKind::Continue,
    EdgeKind::ConditionalTrue,
    EdgeKind::ConditionalFalse,
    EdgeKind::GotoConstNumber,
    EdgeKind::GotoExpression,
    EdgeKind::RuntimeError,
];

/// Constants, written variables `v0..vars` and never-written `u0..u2`
fn arb_leaf(vars: usize) -> impl Strategy<Value = Expression> {
    prop_oneof![
        (-100i64..100).prop_map(|n| Expression::number(n)),
        "[a-z]{0,3}".prop_map(|s| Expression::string(s)),
        (0..vars).prop_map(|j| Expression::variable(format!("v{j}"))),
        (0usize..3).prop_map(|j| Expression::variable(format!("u{j}"))),
    ]
}

fn arb_expression(vars: usize) -> impl Strategy<Value = Expression> {
    prop_oneof![
        arb_leaf(vars),
        (prop::sample::select(OPS), arb_leaf(vars), arb_leaf(vars))
            .prop_map(|(op, left, right)| Expression::binary(op, left, right)),
    ]
}

/// Straight-line SSA program: `v{i}` is written exactly once, by the
/// i-th assignment. Assignments are split across chained blocks.
fn arb_ssa_graph() -> impl Strategy<Value = ControlFlowGraph> {
    (1usize..10)
        .prop_flat_map(|vars| {
            (
                prop::collection::vec(arb_expression(vars), vars),
                prop::collection::vec(prop::bool::ANY, vars),
            )
        })
        .prop_map(|(exprs, splits)| {
            let mut builder = CfgBuilder::new();
            let entry = builder.new_block(BlockKind::Entry, 0);
            let mut current = entry;

            for (index, (expr, split)) in exprs.into_iter().zip(splits).enumerate() {
                if index == 0 || split {
                    let next = builder.new_block(BlockKind::LineStart, index + 1);
                    builder.create_edge(current, next, EdgeKind::Continue).unwrap();
                    current = next;
                }
                builder.add_stmt(current, Statement::assign(format!("v{index}"), expr)).unwrap();
            }
            builder.build()
        })
}

/// SSA program with extra edges between arbitrary blocks
fn arb_graph() -> impl Strategy<Value = ControlFlowGraph> {
    (
        arb_ssa_graph(),
        prop::collection::vec((0usize..16, 0usize..16, prop::sample::select(EDGE_KINDS)), 0..8),
    )
        .prop_map(|(graph, extra)| {
            let ids: Vec<BlockId> = graph.vertices().map(BasicBlock::id).collect();
            let extra = extra
                .into_iter()
                .map(|(from, to, kind)| (ids[from % ids.len()], ids[to % ids.len()], kind));
            graph.add_edges(extra).unwrap()
        })
}

fn stored_type(ty: Type) -> Type {
    if ty.without_error().is_unassigned() {
        ty
    } else {
        ty.without_error()
    }
}

fn typed_assignments(graph: &ControlFlowGraph) -> Vec<TypedAssignment> {
    graph
        .vertices()
        .flat_map(|block| block.statements())
        .filter_map(|stmt| match stmt {
            Statement::TypedAssignment(a) => Some(a.clone()),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_trim_always_true_is_identity(graph in arb_graph()) {
        let trimmed = graph.trim_vertices(|_| true);
        prop_assert_eq!(&trimmed, &graph);
    }

    #[test]
    fn prop_modify_with_copy_is_identity(graph in arb_graph()) {
        let modified = graph
            .modify_vertices(|original, target| {
                target.extend(original.statements().iter().cloned());
                Ok(())
            })
            .unwrap();
        prop_assert_eq!(&modified, &graph);
    }

    #[test]
    fn prop_edge_trim_keeps_vertices(graph in arb_graph(), dropped in prop::sample::select(EDGE_KINDS)) {
        let trimmed = graph.trim_edges(|edge| edge.kind() != dropped);

        let before: Vec<BlockId> = graph.vertices().map(BasicBlock::id).collect();
        let after: Vec<BlockId> = trimmed.vertices().map(BasicBlock::id).collect();
        prop_assert_eq!(before, after);

        let expected: Vec<Edge> = graph.edges().iter().filter(|e| e.kind() != dropped).copied().collect();
        prop_assert_eq!(trimmed.edges(), expected.as_slice());
    }

    #[test]
    fn prop_flow_typing_is_idempotent(graph in arb_ssa_graph()) {
        let first = FlowTyper::new().run(&graph).unwrap();
        let second = FlowTyper::new().run(first.graph()).unwrap();

        prop_assert_eq!(second.passes()[0], 0);
        prop_assert_eq!(second.graph(), first.graph());
        prop_assert_eq!(second.types(), first.types());
    }

    #[test]
    fn prop_table_agrees_with_annotations(graph in arb_ssa_graph()) {
        let typing = FlowTyper::new().run(&graph).unwrap();
        let typed = typed_assignments(typing.graph());

        for assignment in &typed {
            prop_assert_eq!(typing.type_of(assignment.left.name()), Some(stored_type(assignment.ty)));
        }

        // Every annotation is made exactly once, and the last pass makes none
        prop_assert_eq!(typing.passes().iter().sum::<usize>(), typed.len());
        prop_assert_eq!(typing.passes().last(), Some(&0));

        // Each productive pass types at least one of the written names
        let written = VariableUsage::of_graph(&graph).writes().count();
        prop_assert!(typing.passes().len() <= written + 1);
        prop_assert_eq!(typed.len() + typing.indeterminate().len(), written);
    }

    #[test]
    fn prop_passes_only_extend_the_table(graph in arb_graph()) {
        let typer = FlowTyper::new();
        let mut types = typer.seed(&graph).unwrap();
        let mut current = graph;

        loop {
            let before = types.clone();
            let (output, progress) = typing_pass(&current, &mut types).unwrap();

            prop_assert!(types.len() >= before.len());
            for (name, ty) in before.iter() {
                prop_assert_eq!(types.type_of(name), Some(ty), "entry `{}` changed", name);
            }
            prop_assert_eq!(types.len() - before.len(), progress.modified() + progress.recorded());

            if !progress.changed() {
                break;
            }
            current = output;
        }
    }
}
