//! Manifest on disk to a plan-ready graph

use pretty_assertions::assert_eq;
use serde_json::json;
use tfsync_cli::load_project;
use tfsync_core::{resolve_test_definitions, Classification, Mode, Planner};
use tfsync_graph::Urn;
use tfsync_test_utils::FixtureDir;

#[test]
fn manifest_with_files_and_fixtures() {
    let dir = FixtureDir::new();
    dir.write_raw("libs/helpers.js", "export const up = (s) => s.toUpperCase();")
        .write_raw("t1.js", "export function transformEvent(e) { return e; }")
        .write_json("fixtures/in/track.json", &json!({"type": "track"}))
        .write_raw(
            "tfsync.yaml",
            r"
libraries:
  - id: lib-1
    name: Helpers
    import_name: helpers
    file: libs/helpers.js
transformations:
  - id: t1
    name: Enrich
    file: t1.js
    imports: [helpers]
    tests:
      - name: smoke
        input: fixtures/in
",
        );

    let graph = load_project(&dir.path().join("tfsync.yaml")).unwrap();

    let plan = Planner::new(&graph)
        .plan(&Mode::Single("lib-1".into()), &Classification::default())
        .unwrap();
    assert_eq!(plan.test_units.len(), 1);
    assert_eq!(plan.test_units[0].libraries[0].urn, Urn::library("lib-1"));
    assert!(plan.test_units[0].libraries[0].library.code.contains("toUpperCase"));

    let definitions = resolve_test_definitions(&plan.test_units[0].transformation).unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].input, vec![json!({"type": "track"})]);
}

#[test]
fn missing_code_file_names_the_resource() {
    let dir = FixtureDir::new();
    dir.write_raw(
        "tfsync.yaml",
        r"
transformations:
  - id: t1
    name: Enrich
    file: missing.js
",
    );
    let err = load_project(&dir.path().join("tfsync.yaml")).unwrap_err();
    assert!(err.to_string().contains("t1"), "{err}");
}
