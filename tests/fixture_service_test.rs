//! Tests for FixtureService (JSON fixture load/save/check)

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use dms_hierarchy::application::services::{to_json, FixtureIssue, FixtureService};
use dms_hierarchy::application::ApplicationError;
use dms_hierarchy::domain::{Forest, HierarchyNode, NodeType};
use dms_hierarchy::infrastructure::traits::RealFileSystem;
use dms_hierarchy::util::testing;

fn service() -> FixtureService {
    testing::init_test_setup();
    FixtureService::new(Arc::new(RealFileSystem))
}

const ACME: &str = r#"[
  {"id":"1","name":"Acme","type":"manufacturer","children":[
    {"id":"2","name":"Sedan","type":"brand","children":[
      {"id":"3","name":"ModelX","type":"model"}
    ]}
  ]}
]"#;

// ============================================================
// load()
// ============================================================

#[test]
fn given_fixture_file_when_load_then_builds_forest() {
    let temp = TempDir::new().unwrap();
    let path = testing::write_fixture(temp.path(), ACME);

    let forest = service().load(&path).unwrap();

    assert_eq!(forest.roots().len(), 1);
    assert_eq!(forest.node_count(), 3);
    assert_eq!(forest.find("3").unwrap().node_type, NodeType::Model);
}

#[test]
fn given_missing_file_when_load_then_fixture_error() {
    let temp = TempDir::new().unwrap();

    let err = service().load(&temp.path().join("missing.json")).unwrap_err();

    assert!(matches!(err, ApplicationError::Fixture { .. }));
}

#[test]
fn given_malformed_json_when_load_then_fixture_error_names_path() {
    let temp = TempDir::new().unwrap();
    let path = testing::write_fixture(temp.path(), r#"[{"id":"1","type":"manufacturer"}]"#);

    let err = service().load(&path).unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("invalid fixture "), "{msg}");
    assert!(msg.contains("hierarchy.json"), "{msg}");
    assert!(msg.contains("name"), "{msg}");
}

#[test]
fn given_duplicate_ids_when_load_then_still_loads() {
    let temp = TempDir::new().unwrap();
    let json = r#"[{"id":"1","name":"A","type":"manufacturer"},
                   {"id":"1","name":"B","type":"manufacturer"}]"#;
    let path = testing::write_fixture(temp.path(), json);

    let forest = service().load(&path).unwrap();

    assert_eq!(forest.roots().len(), 2);
}

#[test]
fn given_builtin_fixture_when_load_then_three_manufacturers() {
    let forest = FixtureService::load_builtin().unwrap();
    let names: Vec<_> = forest.roots().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Toyota", "Honda", "Suzuki"]);
    assert!(FixtureService::check(&forest).is_empty());
}

// ============================================================
// save()
// ============================================================

#[test]
fn given_forest_when_save_then_reloads_equal() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out").join("hierarchy.json");
    let svc = service();
    let forest = FixtureService::load_builtin().unwrap();

    svc.save(&path, &forest).unwrap();

    assert_eq!(svc.load(&path).unwrap(), forest);
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "temp file left behind: {leftovers:?}");
}

#[test]
fn given_existing_file_when_save_then_overwrites() {
    let temp = TempDir::new().unwrap();
    let path = testing::write_fixture(temp.path(), ACME);
    let svc = service();
    let forest = svc.load(&path).unwrap().delete_subtree("2").unwrap();

    svc.save(&path, &forest).unwrap();

    assert_eq!(svc.load(&path).unwrap().node_count(), 1);
}

#[test]
fn given_directory_at_target_when_save_then_error_and_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hierarchy.json");
    fs::create_dir_all(path.join("occupied")).unwrap();

    let err = service()
        .save(&path, &FixtureService::load_builtin().unwrap())
        .unwrap_err();

    assert!(
        matches!(err, ApplicationError::OperationFailed { .. }),
        "{err}"
    );
    assert!(!temp.path().join("hierarchy.json.tmp").exists());
    assert!(path.join("occupied").is_dir());
}

#[test]
fn given_leaf_when_serialized_then_no_children_key() {
    let forest: Forest = vec![HierarchyNode::new("1", "Acme", NodeType::Manufacturer)].into();

    let json = to_json(&forest).unwrap();

    assert!(!json.contains("children"));
    assert!(json.ends_with("]\n"));
}

// ============================================================
// check()
// ============================================================

#[test]
fn given_bad_nodes_when_check_then_reports_each_issue() {
    let forest: Forest = vec![
        HierarchyNode::new("1", "A", NodeType::Manufacturer).with_children(vec![
            HierarchyNode::new("1", "A again", NodeType::Brand),
            HierarchyNode::new(" ", "No id", NodeType::Brand),
            HierarchyNode::new("4", "", NodeType::Brand),
        ]),
    ]
    .into();

    let issues = FixtureService::check(&forest);

    assert_eq!(
        issues,
        vec![
            FixtureIssue::DuplicateId {
                id: "1".into(),
                count: 2
            },
            FixtureIssue::BlankId {
                name: "No id".into()
            },
            FixtureIssue::BlankName { id: "4".into() },
        ]
    );
}
