//! Tests for the persistent forest mutators and readers

use std::sync::Arc;

use rstest::{fixture, rstest};

use dms_hierarchy::application::services::FixtureService;
use dms_hierarchy::domain::{DomainError, Forest, HierarchyNode, NodeKind, NodeType, NodeUpdate};
use dms_hierarchy::util::testing;

/// Acme → Sedan → ModelX
#[fixture]
fn acme() -> Forest {
    testing::init_test_setup();
    Forest::from(vec![HierarchyNode::new("1", "Acme", NodeType::Manufacturer)
        .with_children(vec![HierarchyNode::new("2", "Sedan", NodeType::Brand)
            .with_children(vec![HierarchyNode::new("3", "ModelX", NodeType::Model)])])])
}

#[fixture]
fn builtin() -> Forest {
    testing::init_test_setup();
    FixtureService::load_builtin().unwrap()
}

fn ids(forest: &Forest) -> Vec<String> {
    forest.iter().map(|(_, n)| n.id.clone()).collect()
}

// ============================================================
// update_node
// ============================================================

#[rstest]
#[case("mfr-toyota")]
#[case("brd-lexus")]
#[case("mdl-ertiga")]
fn given_existing_node_when_renamed_then_only_that_node_changes(
    builtin: Forest,
    #[case] id: &str,
) {
    let node = builtin.find(id).unwrap();
    let update = NodeUpdate::from_node(node).with_name("X");

    let updated = builtin.update_node(&update).unwrap();

    assert_eq!(updated.find(id).unwrap().name, "X");
    assert_eq!(updated.node_count(), builtin.node_count());
    for ((_, before), (_, after)) in builtin.iter().zip(updated.iter()) {
        if before.id != id {
            assert_eq!(before.name, after.name);
            assert_eq!(before.code, after.code);
        }
    }
}

#[rstest]
fn given_update_without_children_when_applied_then_keeps_subtree(acme: Forest) {
    let update = NodeUpdate::new("2").with_name("Saloon");

    let updated = acme.update_node(&update).unwrap();

    let sedan = updated.find("2").unwrap();
    assert_eq!(sedan.name, "Saloon");
    assert!(Arc::ptr_eq(
        &sedan.children[0],
        &acme.find("2").unwrap().children[0]
    ));
}

#[rstest]
fn given_update_with_children_when_applied_then_replaces_subtree(acme: Forest) {
    let update = NodeUpdate {
        children: Some(vec![]),
        ..NodeUpdate::new("2")
    };

    let updated = acme.update_node(&update).unwrap();

    assert!(!updated.contains("3"));
    assert_eq!(updated.node_count(), 2);
}

#[rstest]
fn given_update_when_applied_then_input_forest_unchanged(acme: Forest) {
    let before = acme.clone();

    let _ = acme.update_node(&NodeUpdate::new("3").with_name("ModelY")).unwrap();

    assert_eq!(acme, before);
    assert_eq!(acme.find("3").unwrap().name, "ModelX");
}

#[test]
fn given_nested_duplicate_ids_when_updating_then_every_match_changes() {
    let forest = Forest::from(vec![
        HierarchyNode::new("x", "Outer", NodeType::Manufacturer).with_children(vec![
            HierarchyNode::new("x", "Inner", NodeType::Brand)
                .with_children(vec![HierarchyNode::new("m", "Leaf", NodeType::Model)]),
        ]),
        HierarchyNode::new("x", "Sibling", NodeType::Manufacturer),
    ]);

    let updated = forest.update_node(&NodeUpdate::new("x").with_name("Y")).unwrap();

    let names: Vec<_> = updated.iter().map(|(_, n)| n.name.clone()).collect();
    assert_eq!(names, vec!["Y", "Y", "Leaf", "Y"]);
    let inner = &updated.roots()[0].children[0];
    assert_eq!(inner.node_type, NodeType::Brand);
    assert!(Arc::ptr_eq(
        &inner.children[0],
        &forest.roots()[0].children[0].children[0]
    ));
}

#[rstest]
fn given_unknown_id_when_updating_then_node_not_found(acme: Forest) {
    let err = acme.update_node(&NodeUpdate::new("42").with_name("X")).unwrap_err();
    assert_eq!(err, DomainError::NodeNotFound("42".into()));
}

#[rstest]
fn given_sibling_roots_when_updating_one_then_other_root_shared(builtin: Forest) {
    let updated = builtin
        .update_node(&NodeUpdate::new("mdl-brio").with_name("Brio Satya"))
        .unwrap();

    let toyota_before = &builtin.roots()[0];
    let toyota_after = &updated.roots()[0];
    assert!(Arc::ptr_eq(toyota_before, toyota_after));
    assert!(!Arc::ptr_eq(&builtin.roots()[1], &updated.roots()[1]));
}

// ============================================================
// add_child / add_root
// ============================================================

#[rstest]
fn given_parent_when_adding_child_then_appended_last_and_siblings_shared(acme: Forest) {
    let truck = HierarchyNode::new("4", "Truck", NodeType::Brand);

    let added = acme.add_child("1", truck).unwrap();

    let root = &added.roots()[0];
    let children: Vec<_> = root.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(children, vec!["2", "4"]);
    assert!(Arc::ptr_eq(&root.children[0], &acme.roots()[0].children[0]));
    assert_eq!(added.node_count(), acme.node_count() + 1);
}

#[rstest]
#[case("mfr-honda")]
#[case("brd-suzuki")]
#[case("mdl-lx")]
fn given_any_parent_when_adding_child_then_count_grows_by_one(
    builtin: Forest,
    #[case] parent: &str,
) {
    let child = HierarchyNode::new("new-1", "New", NodeType::Model);

    let added = builtin.add_child(parent, child).unwrap();

    assert_eq!(added.node_count(), builtin.node_count() + 1);
    let last = added.find(parent).unwrap().children.last().unwrap().id.clone();
    assert_eq!(last, "new-1");
}

#[rstest]
fn given_leaf_parent_when_adding_child_then_creates_children(acme: Forest) {
    let added = acme
        .add_child("3", HierarchyNode::new("4", "Trim", NodeType::Model))
        .unwrap();
    assert!(added.find("3").unwrap().has_children());
}

#[rstest]
fn given_unknown_parent_when_adding_child_then_node_not_found(acme: Forest) {
    let err = acme
        .add_child("nope", HierarchyNode::new("4", "Truck", NodeType::Brand))
        .unwrap_err();
    assert_eq!(err, DomainError::NodeNotFound("nope".into()));
}

#[rstest]
fn given_forest_when_adding_root_then_existing_roots_shared(acme: Forest) {
    let added = acme.add_root(HierarchyNode::new("9", "Globex", NodeType::Manufacturer));
    assert_eq!(added.roots().len(), 2);
    assert!(Arc::ptr_eq(&added.roots()[0], &acme.roots()[0]));
}

// ============================================================
// delete_subtree
// ============================================================

#[rstest]
fn given_inner_node_when_deleted_then_subtree_gone(acme: Forest) {
    let deleted = acme.delete_subtree("2").unwrap();

    assert_eq!(ids(&deleted), vec!["1"]);
    assert!(!deleted.roots()[0].has_children());
    assert!(!deleted.contains("3"));
}

#[rstest]
#[case("mfr-toyota")]
#[case("brd-toyota")]
#[case("mdl-hrv")]
fn given_node_when_deleted_then_count_drops_by_subtree_size(
    builtin: Forest,
    #[case] id: &str,
) {
    let size = builtin.find(id).unwrap().subtree_size();

    let deleted = builtin.delete_subtree(id).unwrap();

    assert!(!deleted.contains(id));
    assert_eq!(deleted.node_count(), builtin.node_count() - size);
}

#[rstest]
fn given_root_when_deleted_then_other_roots_shared(builtin: Forest) {
    let deleted = builtin.delete_subtree("mfr-toyota").unwrap();
    assert_eq!(deleted.roots().len(), 2);
    assert!(Arc::ptr_eq(&deleted.roots()[0], &builtin.roots()[1]));
}

#[rstest]
fn given_unknown_id_when_deleting_then_node_not_found(acme: Forest) {
    assert_eq!(
        acme.delete_subtree("42"),
        Err(DomainError::NodeNotFound("42".into()))
    );
}

// ============================================================
// filter_by_substring
// ============================================================

#[rstest]
fn given_empty_query_when_filtering_then_same_forest(builtin: Forest) {
    let filtered = builtin.filter_by_substring("");
    assert_eq!(filtered, builtin);
    assert!(Arc::ptr_eq(&filtered.roots()[0], &builtin.roots()[0]));
}

#[rstest]
fn given_deep_match_when_filtering_then_keeps_ancestor_chain(acme: Forest) {
    let filtered = acme.filter_by_substring("modelx");
    assert_eq!(ids(&filtered), vec!["1", "2", "3"]);
    assert_eq!(filtered.node_count(), 3);
}

#[rstest]
fn given_match_below_siblings_when_filtering_then_prunes_siblings(builtin: Forest) {
    let filtered = builtin.filter_by_substring("innova");
    assert_eq!(ids(&filtered), vec!["mfr-toyota", "brd-toyota", "mdl-innova"]);
}

#[rstest]
fn given_direct_match_when_filtering_then_keeps_all_children(builtin: Forest) {
    let filtered = builtin.filter_by_substring("lexus");
    let lexus = filtered.find("brd-lexus").unwrap();
    assert!(Arc::ptr_eq(lexus, builtin.find("brd-lexus").unwrap()));
    assert!(lexus.has_children());
}

#[rstest]
#[case("TYT")]
#[case("tyt")]
#[case("TyT")]
fn given_code_query_in_any_case_when_filtering_then_matches(builtin: Forest, #[case] q: &str) {
    let filtered = builtin.filter_by_substring(q);
    assert_eq!(filtered.roots().len(), 1);
    assert_eq!(filtered.roots()[0].id, "mfr-toyota");
}

#[rstest]
#[case("modelx")]
#[case("sedan")]
#[case("zzz")]
fn given_query_when_filtering_twice_then_idempotent(acme: Forest, #[case] q: &str) {
    let once = acme.filter_by_substring(q);
    assert_eq!(once.filter_by_substring(q), once);
}

#[rstest]
fn given_no_match_when_filtering_then_empty(builtin: Forest) {
    assert!(builtin.filter_by_substring("tesla").is_empty());
}

// ============================================================
// readers
// ============================================================

#[rstest]
fn given_nested_id_when_ancestors_then_root_to_node_path(builtin: Forest) {
    let path: Vec<_> = builtin
        .ancestors("mdl-lx")
        .unwrap()
        .iter()
        .map(|n| n.id.clone())
        .collect();
    assert_eq!(path, vec!["mfr-toyota", "brd-lexus", "mdl-lx"]);
    assert!(builtin.ancestors("missing").is_none());
}

#[rstest]
fn given_builtin_when_counting_kinds_then_one_manufacturer_per_root(builtin: Forest) {
    let counts = builtin.kind_counts();
    assert_eq!(counts.get(&NodeKind::Manufacturer), Some(&3));
    assert_eq!(builtin.depth(), 3);
}

#[test]
fn given_duplicate_ids_when_checking_then_reported_with_count() {
    let forest = Forest::from(vec![
        HierarchyNode::new("a", "A", NodeType::Manufacturer)
            .with_children(vec![HierarchyNode::new("x", "X", NodeType::Brand)]),
        HierarchyNode::new("b", "B", NodeType::Manufacturer)
            .with_children(vec![HierarchyNode::new("x", "X2", NodeType::Brand)]),
    ]);
    assert_eq!(forest.duplicate_ids(), vec![("x".to_string(), 2)]);
}
