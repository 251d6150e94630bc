//! Tests for rebuilding trees from root-to-node paths.

use rstest::{fixture, rstest};
use serde_json::json;

use treekit::config::Settings;
use treekit::util::testing::{init_test_setup, sample_tree};
use treekit::{
    descendants, node_to_leaf_paths, paths_to_tree, Node, NodeRef, Payload, TreeBuilder,
    TreeError,
};

#[fixture]
fn tree() -> [NodeRef; 6] {
    init_test_setup();
    sample_tree()
}

fn names(nodes: &[NodeRef]) -> Vec<String> {
    nodes.iter().map(|n| n.name()).collect()
}

/// Distinct path elements that may share a label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Tag(u32, &'static str);

impl treekit::PathElement for Tag {
    fn label(&self) -> String {
        self.1.to_string()
    }
}

#[rstest]
fn given_leaf_paths_when_rebuilding_then_same_shape_new_identities(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let paths = node_to_leaf_paths(&a);

    let rebuilt: NodeRef = paths_to_tree(&paths, None, 10).unwrap().expect("non-empty");

    let rebuilt_paths: Vec<Vec<String>> = node_to_leaf_paths(&rebuilt)
        .iter()
        .map(|p| names(p))
        .collect();
    let original_paths: Vec<Vec<String>> = paths.iter().map(|p| names(p)).collect();
    assert_eq!(rebuilt_paths, original_paths);
    assert_ne!(rebuilt, a);
    assert!(!descendants(&a).unwrap().contains(&rebuilt.children()[0]));
}

#[rstest]
fn given_shared_prefixes_when_rebuilding_then_prefix_nodes_collapse() {
    init_test_setup();
    let paths = vec![
        vec!["root", "x", "y"],
        vec!["root", "x", "z"],
        vec!["root", "w"],
    ];
    let rebuilt: NodeRef = paths_to_tree(&paths, None, 10).unwrap().unwrap();

    assert_eq!(rebuilt.name(), "root");
    assert_eq!(names(&rebuilt.children()), ["x", "w"]);
    assert_eq!(names(&rebuilt.children()[0].children()), ["y", "z"]);
}

#[rstest]
fn given_distinct_elements_with_same_label_when_rebuilding_then_renamed_with_suffix() {
    init_test_setup();
    let paths = vec![
        vec![Tag(0, "r"), Tag(1, "x")],
        vec![Tag(0, "r"), Tag(2, "x")],
        vec![Tag(0, "r"), Tag(3, "x")],
    ];
    let rebuilt: NodeRef = paths_to_tree(&paths, None, 10).unwrap().unwrap();
    assert_eq!(names(&rebuilt.children()), ["x", "x_0", "x_1"]);
}

#[rstest]
fn given_retry_ceiling_too_low_when_rebuilding_then_construction_exhausted() {
    init_test_setup();
    let paths = vec![
        vec![Tag(0, "r"), Tag(1, "x")],
        vec![Tag(0, "r"), Tag(2, "x")],
        vec![Tag(0, "r"), Tag(3, "x")],
    ];
    let err = paths_to_tree::<Tag, NodeRef>(&paths, None, 2).unwrap_err();
    assert_eq!(
        err,
        TreeError::ConstructionExhausted {
            name: "x".into(),
            attempts: 2
        }
    );
}

#[rstest]
fn given_settings_when_building_then_separator_applied() {
    init_test_setup();
    let settings = Settings {
        rename_separator: "-".into(),
        ..Default::default()
    };
    let paths = vec![vec![Tag(0, "r"), Tag(1, "x")], vec![Tag(0, "r"), Tag(2, "x")]];

    let mut builder: TreeBuilder<Tag, NodeRef> = TreeBuilder::from_settings(&settings);
    let rebuilt = builder.build(&paths, None).unwrap().unwrap();
    assert_eq!(names(&rebuilt.children()), ["x", "x-0"]);
}

#[rstest]
fn given_payload_fn_when_rebuilding_then_it_overrides_element_payload(tree: [NodeRef; 6]) {
    let [a, ..] = tree;
    let mut payload = Payload::new();
    payload.insert("source".into(), json!("A"));
    a.set_payload(payload).unwrap();

    let tag_depth = |n: &NodeRef| {
        let mut p = Payload::new();
        p.insert("depth".into(), json!(treekit::depth(n)));
        p
    };
    let paths = node_to_leaf_paths(&a);

    let copied: NodeRef = paths_to_tree(&paths, None, 10).unwrap().unwrap();
    assert_eq!(copied.payload().get("source"), Some(&json!("A")));

    let tagged: NodeRef = paths_to_tree(&paths, Some(&tag_depth), 10).unwrap().unwrap();
    assert_eq!(tagged.payload().get("depth"), Some(&json!(0)));
    assert_eq!(tagged.children()[0].children()[0].payload().get("depth"), Some(&json!(2)));
}

#[rstest]
fn given_no_paths_when_rebuilding_then_none() {
    init_test_setup();
    let paths: Vec<Vec<String>> = Vec::new();
    assert_eq!(paths_to_tree::<String, NodeRef>(&paths, None, 10).unwrap(), None);
}
