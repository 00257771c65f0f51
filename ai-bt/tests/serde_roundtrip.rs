#![cfg(feature = "serde")]

use ai_bt::{BehaviorTree, NodeKind, NodeRegistry, Status, TreeDocument};

#[test]
fn document_json_uses_flat_records() {
    let json = r#"{
        "name": "guard",
        "nodes": [
            { "Index": 0, "Parent": -1, "Type": "Selector" },
            { "Index": 1, "Parent": 0, "Type": "Wait", "Duration": "2", "Breakpoint": true },
            { "Index": 2, "Parent": 0, "Type": "Taunt", "Line": "halt" }
        ]
    }"#;

    let doc: TreeDocument = serde_json::from_str(json).expect("deserialize");
    assert_eq!(doc.nodes[1].attributes.get("Duration").map(String::as_str), Some("2"));
    assert!(doc.nodes[1].breakpoint);
    assert!(!doc.nodes[2].breakpoint);
    assert_eq!(doc.nodes[2].type_name, "Taunt");

    let tree: BehaviorTree<()> = BehaviorTree::import(&doc, &NodeRegistry::new()).expect("import");
    let exported = serde_json::to_value(tree.export()).expect("serialize");
    assert_eq!(exported, serde_json::from_str::<serde_json::Value>(json).unwrap());
}

#[test]
fn tree_document_json_roundtrip() {
    let mut tree: BehaviorTree<()> = BehaviorTree::new("roundtrip");
    let root = tree.add_root(NodeKind::RandomSequence);
    tree.add_child(root, NodeKind::wait(0.75));
    tree.add_child(root, NodeKind::placeholder("Emote", Default::default()));

    let json = serde_json::to_string(&tree.export()).expect("serialize");
    let doc: TreeDocument = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(doc, tree.export());
}

#[test]
fn status_serializes_by_name() {
    let json = serde_json::to_string(&Status::Breaking).expect("serialize");
    assert_eq!(json, "\"Breaking\"");
}
