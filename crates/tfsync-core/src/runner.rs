//! Test orchestrator
//!
//! Sequences a run:
//! - load remote resources and derive remote state and graph
//! - plan against the local graph
//! - stage modified resources, reuse versions of unmodified ones
//! - resolve fixtures per transformation
//! - submit batch tests and aggregate the results
//!
//! Any phase failure aborts the run; no partial results are returned.

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, TaskError, UnitError};
use crate::inputs::resolve_test_definitions;
use crate::loader::{RemoteLoader, StoreLoader};
use crate::planner::{Mode, Planner, TestPlan, TestUnit};
use crate::results::{TestResults, TransformationTestWithDefinitions};
use crate::staging::Stager;
use crate::tasker::{run_tasks, Results, Task};
use crate::versions::VersionResolver;
use std::collections::BTreeMap;
use std::sync::Arc;
use tfsync_graph::{ResourceGraph, Urn};
use tfsync_remote::{
    BatchTestRequest, LibraryTestInput, LibraryTestResult, TestDefinition, TransformationStore,
    TransformationTestInput,
};
use tokio_util::sync::CancellationToken;

/// One batch-test submission
#[derive(Debug, Clone)]
struct UnitTask {
    transformation_id: String,
    request: BatchTestRequest,
    definitions: Vec<TestDefinition>,
}

impl Task for UnitTask {
    fn id(&self) -> String {
        self.transformation_id.clone()
    }
}

#[derive(Debug, Clone, Default)]
struct UnitOutcome {
    transformations: Vec<TransformationTestWithDefinitions>,
    libraries: Vec<LibraryTestResult>,
}

/// Runs transformation and library tests against the remote
pub struct TestOrchestrator {
    config: OrchestratorConfig,
    store: Arc<dyn TransformationStore>,
    loader: Arc<dyn RemoteLoader>,
    stager: Stager,
}

impl TestOrchestrator {
    /// Create an orchestrator loading remote state from `store`
    #[must_use]
    pub fn new(store: Arc<dyn TransformationStore>, config: OrchestratorConfig) -> Self {
        Self {
            config,
            loader: Arc::new(StoreLoader::new(Arc::clone(&store))),
            stager: Stager::new(Arc::clone(&store)),
            store,
        }
    }

    /// Replace the remote loader
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn RemoteLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run tests for `local` in `mode`.
    ///
    /// # Errors
    ///
    /// Returns the first failing phase, wrapped in [`OrchestratorError`].
    /// Cancellation through `cancel` yields [`OrchestratorError::Cancelled`].
    pub async fn run(
        &self,
        local: &ResourceGraph,
        mode: &Mode,
        cancel: &CancellationToken,
    ) -> Result<TestResults, OrchestratorError> {
        tracing::info!(%mode, "starting test run");
        ensure_active(cancel)?;

        let remote = self.loader.load_resources_from_remote().await?;
        let remote_state = self.loader.map_remote_to_state(&remote);
        let remote_graph = remote_state.to_graph();
        tracing::debug!(
            managed = remote_state.resources.len(),
            unmanaged = remote_state.unmanaged.len(),
            "remote state built"
        );

        let plan = Planner::new(local).build_plan(
            &remote_graph,
            &remote_state,
            mode,
            &self.config.workspace_id,
        )?;
        if plan.is_empty() {
            tracing::info!("nothing to test");
            return Ok(TestResults::default());
        }
        ensure_active(cancel)?;

        let versions = VersionResolver::new(
            &self.stager,
            local,
            &remote_state,
            self.config.staging_concurrency,
        )
        .resolve(&plan, cancel)
        .await;
        ensure_active(cancel)?;
        let versions = versions?;

        let units = unit_tasks(&plan, &versions)?;

        let libraries = self.run_standalone_libraries(&plan, &versions).await?;
        ensure_active(cancel)?;

        let outcome = self.run_units(units, cancel).await?;

        let mut results = TestResults {
            transformations: outcome.transformations,
            libraries,
        };
        for lib in outcome.libraries {
            if !results.libraries.contains(&lib) {
                results.libraries.push(lib);
            }
        }

        let summary = results.summary();
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            libraries = results.libraries.len(),
            "test run complete"
        );
        Ok(results)
    }

    /// Compile check for libraries no selected transformation uses
    async fn run_standalone_libraries(
        &self,
        plan: &TestPlan,
        versions: &BTreeMap<Urn, String>,
    ) -> Result<Vec<LibraryTestResult>, OrchestratorError> {
        let libraries: Vec<LibraryTestInput> = plan
            .standalone_libraries
            .iter()
            .filter_map(|l| versions.get(&l.urn))
            .map(|v| LibraryTestInput {
                version_id: v.clone(),
            })
            .collect();
        if libraries.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(count = libraries.len(), "testing standalone libraries");
        let request = BatchTestRequest {
            transformations: Vec::new(),
            libraries,
        };
        let response = self
            .store
            .batch_test(&request)
            .await
            .map_err(OrchestratorError::StandaloneLibraries)?;
        Ok(response.validation_output.libraries)
    }

    async fn run_units(
        &self,
        units: Vec<UnitTask>,
        cancel: &CancellationToken,
    ) -> Result<UnitOutcome, OrchestratorError> {
        tracing::info!(
            units = units.len(),
            concurrency = self.config.test_concurrency,
            "running test units"
        );

        let results = Results::new();
        let errors = run_tasks(units, self.config.test_concurrency, cancel, |unit| {
            let results = &results;
            async move {
                tracing::debug!(transformation = %unit.transformation_id, "submitting batch test");
                let response = self.store.batch_test(&unit.request).await?;
                let outcome = UnitOutcome {
                    transformations: response
                        .validation_output
                        .transformations
                        .into_iter()
                        .map(|result| TransformationTestWithDefinitions {
                            result,
                            definitions: unit.definitions.clone(),
                        })
                        .collect(),
                    libraries: response.validation_output.libraries,
                };
                results.store(unit.id(), outcome);
                Ok::<(), UnitError>(())
            }
        })
        .await;

        ensure_active(cancel)?;
        if !errors.is_empty() {
            return Err(OrchestratorError::Execution(errors));
        }

        let mut out = UnitOutcome::default();
        for (_, outcome) in results.into_sorted() {
            out.transformations.extend(outcome.transformations);
            out.libraries.extend(outcome.libraries);
        }
        Ok(out)
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), OrchestratorError> {
    if cancel.is_cancelled() {
        Err(OrchestratorError::Cancelled)
    } else {
        Ok(())
    }
}

/// Fixtures and request for every unit, in plan order
fn unit_tasks(
    plan: &TestPlan,
    versions: &BTreeMap<Urn, String>,
) -> Result<Vec<UnitTask>, OrchestratorError> {
    plan.test_units
        .iter()
        .map(|unit| {
            let definitions = resolve_test_definitions(&unit.transformation).map_err(|source| {
                OrchestratorError::Fixtures {
                    transformation: unit.transformation.id.clone(),
                    source,
                }
            })?;
            let request = build_request(unit, versions, definitions.clone()).map_err(|e| {
                OrchestratorError::Execution(vec![TaskError::Failed {
                    id: unit.transformation.id.clone(),
                    source: e,
                }])
            })?;
            Ok(UnitTask {
                transformation_id: unit.transformation.id.clone(),
                request,
                definitions,
            })
        })
        .collect()
}

/// One transformation with its suite, plus every resolved library version
fn build_request(
    unit: &TestUnit,
    versions: &BTreeMap<Urn, String>,
    definitions: Vec<TestDefinition>,
) -> Result<BatchTestRequest, UnitError> {
    let version_id = versions
        .get(&unit.urn)
        .cloned()
        .ok_or_else(|| UnitError::MissingVersion(unit.urn.clone()))?;
    Ok(BatchTestRequest {
        transformations: vec![TransformationTestInput {
            version_id,
            test_suite: definitions,
        }],
        libraries: unit
            .libraries
            .iter()
            .filter_map(|l| versions.get(&l.urn))
            .map(|v| LibraryTestInput {
                version_id: v.clone(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::PlannedLibrary;
    use pretty_assertions::assert_eq;
    use tfsync_graph::{LibraryResource, TransformationResource};

    #[test]
    fn request_carries_one_transformation_and_its_libraries() {
        let unit = TestUnit {
            urn: Urn::transformation("t1"),
            transformation: TransformationResource::new("t1", "T1", "c"),
            libraries: vec![
                PlannedLibrary {
                    urn: Urn::library("lib-1"),
                    library: LibraryResource::new("lib-1", "L1", "v", "l1"),
                },
                PlannedLibrary {
                    urn: Urn::library("lib-2"),
                    library: LibraryResource::new("lib-2", "L2", "v", "l2"),
                },
            ],
        };
        let versions = BTreeMap::from([
            (Urn::transformation("t1"), "ver-t1".to_string()),
            (Urn::library("lib-1"), "ver-l1".to_string()),
        ]);

        let request = build_request(&unit, &versions, Vec::new()).unwrap();
        assert_eq!(request.transformations.len(), 1);
        assert_eq!(request.transformations[0].version_id, "ver-t1");
        assert_eq!(
            request.libraries,
            vec![LibraryTestInput {
                version_id: "ver-l1".to_string()
            }]
        );
    }

    #[test]
    fn request_without_transformation_version_fails() {
        let unit = TestUnit {
            urn: Urn::transformation("t1"),
            transformation: TransformationResource::new("t1", "T1", "c"),
            libraries: Vec::new(),
        };
        let err = build_request(&unit, &BTreeMap::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, UnitError::MissingVersion(urn) if urn == Urn::transformation("t1")));
    }
}
