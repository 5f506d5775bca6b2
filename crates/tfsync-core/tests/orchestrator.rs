//! End-to-end runs against the in-memory store

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tfsync_core::{
    LoadError, Mode, OrchestratorConfig, OrchestratorError, StagingError, TaskError,
    TestOrchestrator, VersionError, DEFAULT_EVENTS_TEST,
};
use tfsync_graph::{ImportMetadata, Resource, ResourceGraph, ResourceKind, TestSuite};
use tfsync_remote::{LibraryTestInput, Transformation, TransformationLibrary, TransformationStore};
use tfsync_test_utils::{
    create_library, create_transformation, lib_and_consumer_graph, FakeTransformationStore,
    FixtureDir, GraphBuilder, StoreCall, TEST_WORKSPACE,
};
use tokio_util::sync::CancellationToken;

const CODE: &str = "export function transformEvent(e) { return e; }";

fn orchestrator(store: &Arc<FakeTransformationStore>) -> TestOrchestrator {
    let store: Arc<dyn TransformationStore> = store.clone();
    TestOrchestrator::new(store, OrchestratorConfig::new().with_workspace_id(TEST_WORKSPACE))
}

/// t1 claiming the unmanaged remote transformation `rem-free`
fn imported_t1(code: &str) -> ResourceGraph {
    GraphBuilder::new()
        .resource(
            Resource::transformation(create_transformation("t1", code))
                .with_import(ImportMetadata::new("rem-free", TEST_WORKSPACE)),
        )
        .build()
}

fn unmanaged_t1() -> Transformation {
    Transformation {
        id: "rem-free".into(),
        version_id: "ver-free".into(),
        name: "Transformation t1".into(),
        code: CODE.into(),
        language: "javascript".into(),
        workspace_id: TEST_WORKSPACE.into(),
        ..Transformation::default()
    }
}

async fn run(
    store: &Arc<FakeTransformationStore>,
    local: &ResourceGraph,
    mode: Mode,
) -> Result<tfsync_core::TestResults, OrchestratorError> {
    orchestrator(store)
        .run(local, &mode, &CancellationToken::new())
        .await
}

#[tokio::test]
async fn unchanged_project_makes_no_remote_writes() {
    let graph = lib_and_consumer_graph("v1");
    let store = Arc::new(FakeTransformationStore::seeded_from(&graph));

    let results = run(&store, &graph, Mode::Modified).await.unwrap();

    assert!(results.is_empty());
    assert!(store.writes().is_empty());
    assert!(store.batch_tests().is_empty());
}

#[tokio::test]
async fn library_change_stages_library_and_reuses_consumer_version() {
    let store = Arc::new(FakeTransformationStore::seeded_from(&lib_and_consumer_graph("v1")));
    let t1_version = store.listed_version("rem-t1").unwrap();
    let lib_version = store.listed_version("rem-lib-1").unwrap();

    let results = run(&store, &lib_and_consumer_graph("v2"), Mode::Modified)
        .await
        .unwrap();

    assert_eq!(
        store.writes(),
        vec![StoreCall::UpdateLibrary {
            id: "rem-lib-1".into(),
            publish: false
        }]
    );

    let batches = store.batch_tests();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].transformations.len(), 1);
    assert_eq!(batches[0].transformations[0].version_id, t1_version);
    assert_eq!(batches[0].libraries.len(), 1);
    assert_ne!(batches[0].libraries[0].version_id, lib_version);

    assert_eq!(results.transformations.len(), 1);
    assert_eq!(results.transformations[0].definitions[0].name, DEFAULT_EVENTS_TEST);
    assert!(!results.has_failures());
}

#[tokio::test]
async fn unknown_transformation_is_created_unpublished() {
    let store = Arc::new(FakeTransformationStore::new());
    let local = GraphBuilder::new()
        .transformation(create_transformation("t2", CODE))
        .build();

    run(&store, &local, Mode::Modified).await.unwrap();

    assert_eq!(
        store.writes(),
        vec![StoreCall::CreateTransformation {
            external_id: "t2".into(),
            publish: false
        }]
    );
}

#[tokio::test]
async fn standalone_libraries_are_tested_in_one_batch() {
    let store = Arc::new(FakeTransformationStore::new());
    let local = GraphBuilder::new()
        .library(create_library("lib-a", "a"))
        .library(create_library("lib-b", "b"))
        .build();

    let results = run(&store, &local, Mode::All).await.unwrap();

    let batches = store.batch_tests();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].transformations.is_empty());
    assert_eq!(batches[0].libraries.len(), 2);
    assert_eq!(results.libraries.len(), 2);
    assert!(results.libraries.iter().all(|l| l.pass));
}

#[tokio::test]
async fn every_staging_failure_is_reported() {
    let store = Arc::new(FakeTransformationStore::new());
    store.fail_writes_for("lib-b");
    store.fail_writes_for("lib-d");
    let local = GraphBuilder::new()
        .library(create_library("lib-a", "a"))
        .library(create_library("lib-b", "b"))
        .library(create_library("lib-c", "c"))
        .library(create_library("lib-d", "d"))
        .build();

    let err = run(&store, &local, Mode::All).await.unwrap_err();

    let errors = match err {
        OrchestratorError::Staging(StagingError::Joined(errors)) => errors,
        other => panic!("expected staging failure, got {other:?}"),
    };
    let ids: Vec<&str> = errors.iter().map(|e| e.id()).collect();
    assert_eq!(
        ids,
        vec!["transformation-library:lib-b", "transformation-library:lib-d"]
    );
    assert!(store.batch_tests().is_empty());
}

#[tokio::test]
async fn failing_case_is_reported_as_failure() {
    let store = Arc::new(FakeTransformationStore::new());
    store.fail_test(DEFAULT_EVENTS_TEST);
    let local = GraphBuilder::new()
        .transformation(create_transformation("t1", CODE))
        .build();

    let results = run(&store, &local, Mode::All).await.unwrap();

    assert!(results.has_failures());
    assert_eq!(results.summary().failed, 1);
}

#[tokio::test]
async fn fixtures_are_sent_with_the_transformation() {
    let fixtures = FixtureDir::new();
    fixtures
        .write_json("events/track.json", &json!([{"type": "track"}]))
        .write_json("events/t1/input/track.json", &json!([{"type": "track", "override": true}]))
        .write_json("expected/track.json", &json!([{"type": "track"}]));

    let local = GraphBuilder::new()
        .transformation(
            create_transformation("t1", CODE).with_test(
                TestSuite::new("smoke", "events")
                    .with_output("expected")
                    .with_spec_dir(fixtures.path()),
            ),
        )
        .build();
    let store = Arc::new(FakeTransformationStore::new());

    let results = run(&store, &local, Mode::Single("t1".into())).await.unwrap();

    let batches = store.batch_tests();
    let suite = &batches[0].transformations[0].test_suite;
    assert_eq!(suite.len(), 1);
    assert_eq!(suite[0].input, vec![json!({"type": "track", "override": true})]);
    assert_eq!(suite[0].expected_output, Some(vec![json!({"type": "track"})]));
    assert!(suite[0].name.starts_with("smoke("));
    assert_eq!(results.transformations[0].definitions, *suite);
}

#[tokio::test]
async fn unit_libraries_are_merged_into_results() {
    let local = lib_and_consumer_graph("v1");
    let store = Arc::new(FakeTransformationStore::seeded_from(&local));
    let lib_version = store.listed_version("rem-lib-1").unwrap();

    let results = run(&store, &local, Mode::All).await.unwrap();

    assert!(store.writes().is_empty());
    assert_eq!(
        store.batch_tests()[0].libraries,
        vec![LibraryTestInput {
            version_id: lib_version.clone()
        }]
    );
    assert_eq!(results.libraries.len(), 1);
    assert_eq!(results.libraries[0].version_id, lib_version);
}

#[tokio::test]
async fn listing_failure_aborts_the_run() {
    let store = Arc::new(FakeTransformationStore::new());
    store.fail_listing();

    let err = run(&store, &lib_and_consumer_graph("v1"), Mode::All)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::Load(LoadError::Transformations(_))));
}

#[tokio::test]
async fn cancelled_run_touches_nothing() {
    let store = Arc::new(FakeTransformationStore::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = orchestrator(&store)
        .run(&lib_and_consumer_graph("v1"), &Mode::All, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::Cancelled));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn unknown_single_target_is_a_plan_error() {
    let store = Arc::new(FakeTransformationStore::new());
    let err = run(&store, &lib_and_consumer_graph("v1"), Mode::Single("nope".into()))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "building test plan: resource with ID 'nope' not found"
    );
}

#[tokio::test]
async fn unmodified_library_without_version_fails_staging() {
    let local = lib_and_consumer_graph("v1");
    let store = Arc::new(FakeTransformationStore::seeded_from(&local));
    store.add_library(TransformationLibrary {
        id: "rem-lib-1".into(),
        version_id: String::new(),
        name: "Library lib-1".into(),
        code: "v1".into(),
        language: "javascript".into(),
        import_name: "lib1".into(),
        workspace_id: TEST_WORKSPACE.into(),
        external_id: "lib-1".into(),
        ..TransformationLibrary::default()
    });

    let err = run(&store, &local, Mode::All).await.unwrap_err();

    let errors = match err {
        OrchestratorError::Staging(StagingError::Joined(errors)) => errors,
        other => panic!("expected staging failure, got {other:?}"),
    };
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        TaskError::Failed {
            id,
            source: VersionError::NoVersionId { kind: ResourceKind::Library, .. },
        } if id == "transformation-library:lib-1"
    ));
    assert!(store.writes().is_empty());
    assert!(store.batch_tests().is_empty());
}

#[tokio::test]
async fn unmodified_import_reuses_unmanaged_version() {
    let store = Arc::new(FakeTransformationStore::new());
    store.add_transformation(unmanaged_t1());

    run(&store, &imported_t1(CODE), Mode::All).await.unwrap();

    assert!(store.writes().is_empty());
    let batches = store.batch_tests();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].transformations[0].version_id, "ver-free");
}

#[tokio::test]
async fn modified_import_updates_the_claimed_remote_id() {
    let store = Arc::new(FakeTransformationStore::new());
    store.add_transformation(unmanaged_t1());

    run(
        &store,
        &imported_t1("export function transformEvent(e) { e.seen = true; return e; }"),
        Mode::Modified,
    )
    .await
    .unwrap();

    assert_eq!(
        store.writes(),
        vec![StoreCall::UpdateTransformation {
            id: "rem-free".into(),
            publish: false
        }]
    );
    let batches = store.batch_tests();
    assert_eq!(batches.len(), 1);
    assert_ne!(batches[0].transformations[0].version_id, "ver-free");
}

#[tokio::test]
async fn batch_test_failure_names_the_transformation() {
    let store = Arc::new(FakeTransformationStore::new());
    store.fail_batch_tests();
    let local = GraphBuilder::new()
        .transformation(create_transformation("t1", CODE))
        .build();

    let err = run(&store, &local, Mode::All).await.unwrap_err();

    let errors = match &err {
        OrchestratorError::Execution(errors) => errors,
        other => panic!("expected execution failure, got {other:?}"),
    };
    let ids: Vec<&str> = errors.iter().map(|e| e.id()).collect();
    assert_eq!(ids, vec!["t1"]);
    assert!(err.to_string().contains("running tests for t1"), "{err}");
    assert_eq!(store.batch_tests().len(), 1);
}

#[tokio::test]
async fn malformed_fixture_fails_before_any_batch_test() {
    let fixtures = FixtureDir::new();
    fixtures
        .write_json("events/good.json", &json!({"type": "track"}))
        .write_raw("events/broken.json", "{\"type\": ");
    let local = GraphBuilder::new()
        .transformation(
            create_transformation("t1", CODE)
                .with_test(TestSuite::new("smoke", "events").with_spec_dir(fixtures.path())),
        )
        .build();
    let store = Arc::new(FakeTransformationStore::new());

    let err = run(&store, &local, Mode::All).await.unwrap_err();

    match &err {
        OrchestratorError::Fixtures { transformation, .. } => assert_eq!(transformation, "t1"),
        other => panic!("expected fixture failure, got {other:?}"),
    }
    let broken = fixtures.path().join("events").join("broken.json");
    assert!(err.to_string().contains(&broken.display().to_string()), "{err}");
    assert!(store.batch_tests().is_empty());
}

#[tokio::test]
async fn failing_standalone_library_is_reported() {
    let store = Arc::new(FakeTransformationStore::new());
    // First version the fake hands out
    store.fail_library_version("ver-lib-a-1");
    let local = GraphBuilder::new()
        .library(create_library("lib-a", "a"))
        .build();

    let results = run(&store, &local, Mode::All).await.unwrap();

    assert_eq!(results.libraries.len(), 1);
    assert!(!results.libraries[0].pass);
    assert!(results.has_failures());
    assert_eq!(results.summary().libraries_failed, 1);
}
