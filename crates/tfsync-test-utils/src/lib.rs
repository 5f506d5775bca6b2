//! Testing utilities for tfsync
//!
//! Resource builders, fixture directories and [`FakeTransformationStore`],
//! an in-memory store that records every call.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tempfile::TempDir;
use tfsync_graph::{
    LibraryResource, Resource, ResourceGraph, ResourceKind, TransformationResource, Urn,
};
use tfsync_remote::{
    BatchPublishRequest, BatchPublishResponse, BatchTestRequest, BatchTestResponse,
    LibraryRequest, LibraryTestResult, StoreError, TestResult, TestRunStatus,
    TestSuiteRunResult, Transformation, TransformationLibrary, TransformationRequest,
    TransformationStore, TransformationTestResult, ValidationOutput,
};

pub const TEST_WORKSPACE: &str = "ws-test";

/// Transformation with a name derived from its ID
pub fn create_transformation(id: &str, code: &str) -> TransformationResource {
    TransformationResource::new(id, format!("Transformation {id}"), code)
}

/// Library whose import name is its ID without dashes
pub fn create_library(id: &str, code: &str) -> LibraryResource {
    LibraryResource::new(id, format!("Library {id}"), code, id.replace('-', ""))
}

/// Builder for local resource graphs
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ResourceGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transformation(mut self, t: TransformationResource) -> Self {
        self.graph.add_resource(Resource::transformation(t));
        self
    }

    pub fn library(mut self, l: LibraryResource) -> Self {
        self.graph.add_resource(Resource::library(l));
        self
    }

    pub fn resource(mut self, r: Resource) -> Self {
        self.graph.add_resource(r);
        self
    }

    /// Transformation `t` imports library `lib`
    pub fn uses(mut self, t: &str, lib: &str) -> Self {
        self.graph
            .add_dependency(&Urn::transformation(t), &Urn::library(lib));
        self
    }

    /// Library `from` imports library `to`
    pub fn library_uses(mut self, from: &str, to: &str) -> Self {
        self.graph.add_dependency(&Urn::library(from), &Urn::library(to));
        self
    }

    pub fn build(self) -> ResourceGraph {
        self.graph
    }
}

/// lib-1 (code `v1`) used by t1
pub fn lib_and_consumer_graph(lib_code: &str) -> ResourceGraph {
    GraphBuilder::new()
        .library(create_library("lib-1", lib_code))
        .transformation(create_transformation("t1", "export function transformEvent(e) { return e; }"))
        .uses("t1", "lib-1")
        .build()
}

/// Temporary fixture tree
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create fixture dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `value` as JSON at `rel`, creating parent directories
    pub fn write_json(&self, rel: &str, value: &Value) -> &Self {
        self.write_raw(rel, &value.to_string())
    }

    pub fn write_raw(&self, rel: &str, body: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture parent");
        }
        std::fs::write(path, body).expect("write fixture");
        self
    }
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

/// A call made against [`FakeTransformationStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    CreateTransformation { external_id: String, publish: bool },
    UpdateTransformation { id: String, publish: bool },
    ListTransformations,
    CreateLibrary { external_id: String, publish: bool },
    UpdateLibrary { id: String, publish: bool },
    ListLibraries,
    BatchPublish,
    BatchTest(BatchTestRequest),
}

impl StoreCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::CreateTransformation { .. }
                | Self::UpdateTransformation { .. }
                | Self::CreateLibrary { .. }
                | Self::UpdateLibrary { .. }
                | Self::BatchPublish
        )
    }
}

#[derive(Debug, Default)]
struct FakeState {
    transformations: BTreeMap<String, Transformation>,
    libraries: BTreeMap<String, TransformationLibrary>,
    calls: Vec<StoreCall>,
    versions: u64,
    failing_writes: HashSet<String>,
    failing_tests: HashSet<String>,
    failing_libraries: HashSet<String>,
    fail_listing: bool,
    fail_batch_tests: bool,
}

impl FakeState {
    fn next_version(&mut self, id: &str) -> String {
        self.versions += 1;
        format!("ver-{id}-{}", self.versions)
    }
}

/// In-memory [`TransformationStore`].
///
/// Listings only change on published writes. Batch tests pass unless the
/// test name or library version was marked failing, or every batch test
/// was set to fail.
#[derive(Debug, Default)]
pub struct FakeTransformationStore {
    state: Mutex<FakeState>,
}

impl FakeTransformationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the listing with managed copies of every resource in `graph`
    pub fn seeded_from(graph: &ResourceGraph) -> Self {
        let store = Self::new();
        store.seed(graph);
        store
    }

    pub fn seed(&self, graph: &ResourceGraph) {
        let mut state = self.state.lock();
        for lib in graph.resources_by_type(ResourceKind::Library) {
            let Some(l) = lib.payload.as_library() else { continue };
            let version_id = state.next_version(&l.id);
            state.libraries.insert(
                format!("rem-{}", l.id),
                TransformationLibrary {
                    id: format!("rem-{}", l.id),
                    version_id,
                    name: l.name.clone(),
                    description: l.description.clone(),
                    code: l.code.clone(),
                    language: l.language.clone(),
                    import_name: l.import_name.clone(),
                    workspace_id: TEST_WORKSPACE.to_string(),
                    external_id: l.id.clone(),
                },
            );
        }
        for res in graph.resources_by_type(ResourceKind::Transformation) {
            let Some(t) = res.payload.as_transformation() else { continue };
            let imports = graph
                .dependencies(&res.urn)
                .iter()
                .filter_map(|dep| graph.get_resource(dep))
                .filter_map(|r| r.payload.as_library())
                .map(|l| l.import_name.clone())
                .collect();
            let version_id = state.next_version(&t.id);
            state.transformations.insert(
                format!("rem-{}", t.id),
                Transformation {
                    id: format!("rem-{}", t.id),
                    version_id,
                    name: t.name.clone(),
                    description: t.description.clone(),
                    code: t.code.clone(),
                    language: t.language.clone(),
                    imports,
                    workspace_id: TEST_WORKSPACE.to_string(),
                    external_id: t.id.clone(),
                },
            );
        }
    }

    pub fn add_transformation(&self, t: Transformation) {
        self.state.lock().transformations.insert(t.id.clone(), t);
    }

    pub fn add_library(&self, l: TransformationLibrary) {
        self.state.lock().libraries.insert(l.id.clone(), l);
    }

    /// Creates and updates for this external ID fail
    pub fn fail_writes_for(&self, external_id: &str) {
        self.state.lock().failing_writes.insert(external_id.to_string());
    }

    /// Batch-test cases with this name fail
    pub fn fail_test(&self, name: &str) {
        self.state.lock().failing_tests.insert(name.to_string());
    }

    /// Compile checks for this library version fail
    pub fn fail_library_version(&self, version_id: &str) {
        self.state.lock().failing_libraries.insert(version_id.to_string());
    }

    pub fn fail_listing(&self) {
        self.state.lock().fail_listing = true;
    }

    /// Every batch-test request fails with a server error
    pub fn fail_batch_tests(&self) {
        self.state.lock().fail_batch_tests = true;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(StoreCall::is_write).collect()
    }

    pub fn batch_tests(&self) -> Vec<BatchTestRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::BatchTest(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    /// Version ID of the listed resource with this remote ID
    pub fn listed_version(&self, remote_id: &str) -> Option<String> {
        let state = self.state.lock();
        state
            .transformations
            .get(remote_id)
            .map(|t| t.version_id.clone())
            .or_else(|| state.libraries.get(remote_id).map(|l| l.version_id.clone()))
    }

    fn rejected(external_id: &str) -> StoreError {
        StoreError::Api {
            status: 400,
            body: format!("rejected {external_id}"),
        }
    }
}

#[async_trait]
impl TransformationStore for FakeTransformationStore {
    async fn create_transformation(
        &self,
        req: &TransformationRequest,
        publish: bool,
    ) -> Result<Transformation, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CreateTransformation {
            external_id: req.external_id.clone(),
            publish,
        });
        if state.failing_writes.contains(&req.external_id) {
            return Err(Self::rejected(&req.external_id));
        }
        let created = Transformation {
            id: format!("rem-{}", req.external_id),
            version_id: state.next_version(&req.external_id),
            name: req.name.clone(),
            description: req.description.clone(),
            code: req.code.clone(),
            language: req.language.clone(),
            imports: Vec::new(),
            workspace_id: TEST_WORKSPACE.to_string(),
            external_id: req.external_id.clone(),
        };
        if publish {
            state.transformations.insert(created.id.clone(), created.clone());
        }
        Ok(created)
    }

    async fn update_transformation(
        &self,
        id: &str,
        req: &TransformationRequest,
        publish: bool,
    ) -> Result<Transformation, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::UpdateTransformation {
            id: id.to_string(),
            publish,
        });
        if state.failing_writes.contains(&req.external_id) {
            return Err(Self::rejected(&req.external_id));
        }
        let mut updated = state.transformations.get(id).cloned().ok_or(StoreError::Api {
            status: 404,
            body: format!("transformation {id} not found"),
        })?;
        updated.version_id = state.next_version(&req.external_id);
        updated.name.clone_from(&req.name);
        updated.code.clone_from(&req.code);
        if publish {
            state.transformations.insert(id.to_string(), updated.clone());
        }
        Ok(updated)
    }

    async fn list_transformations(&self) -> Result<Vec<Transformation>, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::ListTransformations);
        if state.fail_listing {
            return Err(StoreError::Other("listing unavailable".to_string()));
        }
        Ok(state.transformations.values().cloned().collect())
    }

    async fn create_library(
        &self,
        req: &LibraryRequest,
        publish: bool,
    ) -> Result<TransformationLibrary, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::CreateLibrary {
            external_id: req.external_id.clone(),
            publish,
        });
        if state.failing_writes.contains(&req.external_id) {
            return Err(Self::rejected(&req.external_id));
        }
        let created = TransformationLibrary {
            id: format!("rem-{}", req.external_id),
            version_id: state.next_version(&req.external_id),
            name: req.name.clone(),
            description: req.description.clone(),
            code: req.code.clone(),
            language: req.language.clone(),
            import_name: req.external_id.replace('-', ""),
            workspace_id: TEST_WORKSPACE.to_string(),
            external_id: req.external_id.clone(),
        };
        if publish {
            state.libraries.insert(created.id.clone(), created.clone());
        }
        Ok(created)
    }

    async fn update_library(
        &self,
        id: &str,
        req: &LibraryRequest,
        publish: bool,
    ) -> Result<TransformationLibrary, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::UpdateLibrary {
            id: id.to_string(),
            publish,
        });
        if state.failing_writes.contains(&req.external_id) {
            return Err(Self::rejected(&req.external_id));
        }
        let mut updated = state.libraries.get(id).cloned().ok_or(StoreError::Api {
            status: 404,
            body: format!("library {id} not found"),
        })?;
        updated.version_id = state.next_version(&req.external_id);
        updated.name.clone_from(&req.name);
        updated.code.clone_from(&req.code);
        if publish {
            state.libraries.insert(id.to_string(), updated.clone());
        }
        Ok(updated)
    }

    async fn list_libraries(&self) -> Result<Vec<TransformationLibrary>, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::ListLibraries);
        if state.fail_listing {
            return Err(StoreError::Other("listing unavailable".to_string()));
        }
        Ok(state.libraries.values().cloned().collect())
    }

    async fn batch_publish(
        &self,
        _req: &BatchPublishRequest,
    ) -> Result<BatchPublishResponse, StoreError> {
        self.state.lock().calls.push(StoreCall::BatchPublish);
        Ok(BatchPublishResponse {
            published: true,
            ..BatchPublishResponse::default()
        })
    }

    async fn batch_test(&self, req: &BatchTestRequest) -> Result<BatchTestResponse, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::BatchTest(req.clone()));
        if state.fail_batch_tests {
            return Err(StoreError::Api {
                status: 500,
                body: "batch test unavailable".to_string(),
            });
        }

        let transformations: Vec<TransformationTestResult> = req
            .transformations
            .iter()
            .map(|input| {
                let results: Vec<TestResult> = input
                    .test_suite
                    .iter()
                    .map(|def| TestResult {
                        name: def.name.clone(),
                        status: if state.failing_tests.contains(&def.name) {
                            TestRunStatus::Fail
                        } else {
                            TestRunStatus::Pass
                        },
                        actual_output: def.input.clone(),
                        ..TestResult::default()
                    })
                    .collect();
                let pass = results.iter().all(|r| r.status == TestRunStatus::Pass);
                TransformationTestResult {
                    version_id: input.version_id.clone(),
                    pass,
                    test_suite_result: TestSuiteRunResult {
                        status: if pass { TestRunStatus::Pass } else { TestRunStatus::Fail },
                        results,
                    },
                    ..TransformationTestResult::default()
                }
            })
            .collect();
        let libraries: Vec<LibraryTestResult> = req
            .libraries
            .iter()
            .map(|lib| LibraryTestResult {
                version_id: lib.version_id.clone(),
                pass: !state.failing_libraries.contains(&lib.version_id),
                ..LibraryTestResult::default()
            })
            .collect();

        let pass = transformations.iter().all(|t| t.pass) && libraries.iter().all(|l| l.pass);
        Ok(BatchTestResponse {
            pass,
            validation_output: ValidationOutput {
                libraries,
                transformations,
            },
            ..BatchTestResponse::default()
        })
    }
}
