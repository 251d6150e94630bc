//! Tests for the traversal engine: visit, map, breadth-first and undirected expansion.

use rstest::{fixture, rstest};

use treekit::queries::{descendants, is_leaf};
use treekit::util::testing::{init_test_setup, sample_tree};
use treekit::{
    breadth_first, breadth_first_undirected, find_node, find_nodes, map, prune, size, visit,
    MutableNode, Node, NodeRef, Order, Payload, TreeError, TreeResult,
};

#[fixture]
fn tree() -> [NodeRef; 6] {
    init_test_setup();
    sample_tree()
}

fn names(nodes: &[NodeRef]) -> Vec<String> {
    nodes.iter().map(|n| n.name()).collect()
}

fn visit_names(node: &NodeRef, order: Order, max_hops: Option<usize>) -> Vec<String> {
    let mut seen = Vec::new();
    let stopped = visit(
        node,
        |n: &NodeRef| -> TreeResult<bool> {
            seen.push(n.name());
            Ok(false)
        },
        order,
        max_hops,
    )
    .unwrap();
    assert!(!stopped, "full traversal must report no early exit");
    seen
}

// ============================================================
// visit
// ============================================================

#[rstest]
fn given_pre_order_when_visiting_then_node_before_descendants_left_to_right(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    assert_eq!(visit_names(&a, Order::Pre, None), ["A", "B", "D", "E", "C", "F"]);
}

#[rstest]
fn given_post_order_when_visiting_then_order_matches_pre_order(tree: [NodeRef; 6]) {
    // The post-order callback fires once children are pushed, not after they are processed.
    let [a, ..] = tree;
    assert_eq!(
        visit_names(&a, Order::Post, None),
        visit_names(&a, Order::Pre, None)
    );
}

#[rstest]
fn given_level_order_when_visiting_then_grouped_by_depth(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    assert_eq!(visit_names(&a, Order::Level, None), ["A", "B", "C", "D", "E", "F"]);
    assert_eq!(visit_names(&a, Order::Level, Some(1)), ["A", "B", "C"]);
}

#[rstest]
#[case(Order::Pre)]
#[case(Order::Post)]
fn given_max_hops_when_visiting_then_deeper_subtrees_skipped(tree: [NodeRef; 6], #[case] order: Order) {
    let [a, b, ..] = tree;
    assert_eq!(visit_names(&a, order, Some(1)), ["A", "B", "C"]);
    assert_eq!(visit_names(&a, order, Some(0)), ["A"]);
    assert_eq!(visit_names(&b, order, Some(1)), ["B", "D", "E"]);
}

#[rstest]
#[case(Order::Pre)]
#[case(Order::Post)]
fn given_stop_signal_on_c_when_visiting_then_f_never_visited(tree: [NodeRef; 6], #[case] order: Order) {
    let [a, ..] = tree;
    let mut seen = Vec::new();
    let stopped = visit(
        &a,
        |n: &NodeRef| -> TreeResult<bool> {
            seen.push(n.name());
            Ok(n.name() == "C")
        },
        order,
        None,
    )
    .unwrap();

    assert!(stopped);
    assert_eq!(seen, ["A", "B", "D", "E", "C"]);
}

#[rstest]
fn given_single_node_tree_when_visiting_then_only_root_seen() {
    init_test_setup();
    let single = NodeRef::new_root("single", Payload::new());
    assert_eq!(visit_names(&single, Order::Pre, None), ["single"]);
    assert_eq!(size(&single).unwrap(), 1);
}

#[derive(Debug, PartialEq)]
enum WalkError {
    Tree(TreeError),
    Rejected(String),
}

impl From<TreeError> for WalkError {
    fn from(e: TreeError) -> Self {
        WalkError::Tree(e)
    }
}

#[rstest]
fn given_failing_callback_when_visiting_then_error_propagates_unmodified(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let mut seen = Vec::new();
    let result = visit(
        &a,
        |n: &NodeRef| {
            seen.push(n.name());
            if n.name() == "E" {
                Err(WalkError::Rejected(n.name()))
            } else {
                Ok(false)
            }
        },
        Order::Pre,
        None,
    );

    assert_eq!(result, Err(WalkError::Rejected("E".into())));
    assert_eq!(seen, ["A", "B", "D", "E"]);
}

#[rstest]
fn given_removed_node_when_visiting_then_missing_capability_before_any_callback(tree: [NodeRef; 6]) {
    let [_, b, ..] = tree;
    b.remove().unwrap();

    let mut calls = 0;
    let result = visit(
        &b,
        |_: &NodeRef| -> Result<bool, WalkError> {
            calls += 1;
            Ok(false)
        },
        Order::Pre,
        None,
    );

    assert_eq!(
        result,
        Err(WalkError::Tree(TreeError::MissingCapability {
            operation: "visit".into()
        }))
    );
    assert_eq!(calls, 0);
}

#[rstest]
fn given_removed_node_when_mapping_then_missing_capability_before_any_callback(tree: [NodeRef; 6]) {
    let [_, b, ..] = tree;
    b.remove().unwrap();

    let mut calls = 0;
    let result = map(
        &b,
        |n: &NodeRef| -> Result<Option<NodeRef>, WalkError> {
            calls += 1;
            Ok(Some(n.clone()))
        },
        Order::Pre,
    );

    assert_eq!(
        result,
        Err(WalkError::Tree(TreeError::MissingCapability {
            operation: "map".into()
        }))
    );
    assert_eq!(calls, 0);
}

#[rstest]
fn given_removed_node_when_breadth_first_then_missing_capability_before_any_callback(
    tree: [NodeRef; 6],
) {
    let [.., c, _, _, _] = tree;
    c.remove().unwrap();

    let mut calls = 0;
    let result = breadth_first(
        &c,
        |_: &NodeRef, _| -> Result<bool, WalkError> {
            calls += 1;
            Ok(false)
        },
        None,
    );

    assert_eq!(
        result,
        Err(WalkError::Tree(TreeError::MissingCapability {
            operation: "breadth_first".into()
        }))
    );
    assert_eq!(calls, 0);
}

#[rstest]
fn given_removed_node_when_expanding_undirected_then_missing_capability(tree: [NodeRef; 6]) {
    let [_, b, ..] = tree;
    b.remove().unwrap();

    let err = breadth_first_undirected(&b, None).unwrap_err();
    assert_eq!(
        err,
        TreeError::MissingCapability {
            operation: "breadth_first_undirected".into()
        }
    );
}

// ============================================================
// map / prune
// ============================================================

#[rstest]
fn given_pre_order_map_dropping_leaves_then_only_original_leaves_removed(tree: [NodeRef; 6]) {
    let [a, b, c, ..] = tree;
    let rewritten = map(
        &a,
        |n: &NodeRef| -> TreeResult<Option<NodeRef>> {
            Ok(if is_leaf(n) { None } else { Some(n.clone()) })
        },
        Order::Pre,
    )
    .unwrap()
    .expect("root survives");

    assert_eq!(rewritten, a);
    assert_eq!(a.children(), vec![b.clone(), c.clone()]);
    assert!(b.children().is_empty());
    assert!(c.children().is_empty());
}

#[rstest]
fn given_post_order_map_dropping_leaves_then_rewritten_children_are_seen(tree: [NodeRef; 6]) {
    // Children are rewritten first, so B and C become leaves before they are visited.
    let [a, ..] = tree;
    let rewritten = map(
        &a,
        |n: &NodeRef| -> TreeResult<Option<NodeRef>> {
            Ok(if is_leaf(n) { None } else { Some(n.clone()) })
        },
        Order::Post,
    )
    .unwrap();

    assert_eq!(rewritten, None);
}

#[rstest]
fn given_pre_order_map_replacing_a_node_then_replacement_takes_its_place(tree: [NodeRef; 6]) {
    let [a, b, c, ..] = tree;
    let g = a.forest().insert("G", Payload::new(), None).unwrap();

    let mut visited = Vec::new();
    map(
        &a,
        |n: &NodeRef| -> TreeResult<Option<NodeRef>> {
            visited.push(n.name());
            Ok(Some(if *n == c { g.clone() } else { n.clone() }))
        },
        Order::Pre,
    )
    .unwrap();

    assert_eq!(names(&a.children()), ["B", "G"]);
    assert_eq!(g.parent(), Some(a.clone()));
    assert_eq!(c.parent(), None);
    assert_eq!(b.parent(), Some(a));
    assert_eq!(visited, ["A", "B", "D", "E", "C"]);
}

#[rstest]
fn given_level_order_when_mapping_then_invalid_argument(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let err = map(
        &a,
        |n: &NodeRef| -> TreeResult<Option<NodeRef>> { Ok(Some(n.clone())) },
        Order::Level,
    )
    .unwrap_err();
    assert!(matches!(err, TreeError::InvalidArgument(_)));
}

#[rstest]
fn given_predicate_when_pruning_then_matching_subtrees_removed(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let all_before = descendants(&a).unwrap();

    let pruned = prune(&a, |n| n.name() == "B").unwrap().expect("root kept");

    let remaining = descendants(&pruned).unwrap();
    assert_eq!(names(&remaining), ["C", "F"]);
    let expected: Vec<_> = all_before
        .into_iter()
        .filter(|n| !["B", "D", "E"].contains(&n.name().as_str()))
        .collect();
    assert_eq!(remaining, expected);
}

#[rstest]
fn given_predicate_matching_root_when_pruning_then_none(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    assert_eq!(prune(&a, |n| n.name() == "A").unwrap(), None);
    assert_eq!(a.children().len(), 2, "a pruned root is left untouched");
}

#[rstest]
fn given_set_children_with_foreign_node_then_refused(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let stranger = NodeRef::new_root("X", Payload::new());
    let err = a.set_children(vec![stranger]).unwrap_err();
    assert!(matches!(err, TreeError::ForeignNode(_)));
}

// ============================================================
// breadth_first / breadth_first_undirected
// ============================================================

#[rstest]
fn given_tree_when_breadth_first_then_levels_reported(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let mut seen = Vec::new();
    breadth_first(
        &a,
        |n: &NodeRef, level| -> TreeResult<bool> {
            seen.push((n.name(), level));
            Ok(false)
        },
        None,
    )
    .unwrap();

    let expected: Vec<(String, usize)> = [("A", 0), ("B", 1), ("C", 1), ("D", 2), ("E", 2), ("F", 2)]
        .iter()
        .map(|(n, l)| (n.to_string(), *l))
        .collect();
    assert_eq!(seen, expected);
}

#[rstest]
fn given_max_level_when_breadth_first_then_deeper_levels_pruned(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let mut seen = Vec::new();
    let stopped = breadth_first(
        &a,
        |n: &NodeRef, _| -> TreeResult<bool> {
            seen.push(n.name());
            Ok(false)
        },
        Some(1),
    )
    .unwrap();
    assert!(!stopped);
    assert_eq!(seen, ["A", "B", "C"]);
}

#[rstest]
fn given_stop_signal_when_breadth_first_then_returns_true(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let mut seen = Vec::new();
    let stopped = breadth_first(
        &a,
        |n: &NodeRef, level| -> TreeResult<bool> {
            seen.push(n.name());
            Ok(level == 2)
        },
        None,
    )
    .unwrap();
    assert!(stopped);
    assert_eq!(seen, ["A", "B", "C", "D"]);
}

#[rstest]
#[case(None, &["D", "B", "E", "A", "C", "F"])]
#[case(Some(0), &["D"])]
#[case(Some(1), &["D", "B"])]
#[case(Some(2), &["D", "B", "E", "A"])]
fn given_hop_limit_when_expanding_undirected_then_discovery_order(
    tree: [NodeRef; 6],
    #[case] max_hops: Option<usize>,
    #[case] expected: &[&str],
) {
    let [.., d, _, _] = tree;
    assert_eq!(names(&breadth_first_undirected(&d, max_hops).unwrap()), expected);
}

// ============================================================
// find_nodes / find_node
// ============================================================

#[rstest]
fn given_predicate_when_finding_nodes_then_pre_order_matches(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let found = find_nodes(&a, |n| n.name() != "B" && is_leaf(n)).unwrap();
    assert_eq!(names(&found), ["D", "E", "F"]);
}

#[rstest]
fn given_predicate_when_finding_node_then_closest_level_wins(tree: [NodeRef; 6]) {
    let [a, _, c, ..] = tree;
    let found = find_node(&a, |n, _| !n.children().is_empty() && n.name() != "A").unwrap();
    assert_eq!(found.map(|n| n.name()), Some("B".to_string()));

    let at_level_two = find_node(&a, |_, level| level == 2).unwrap();
    assert_eq!(at_level_two.map(|n| n.name()), Some("D".to_string()));

    assert_eq!(find_node(&c, |n, _| n.name() == "D").unwrap(), None);
}
