//! Version resolution for every resource a plan touches
//!
//! Modified resources are staged through the bounded pool. Unmodified ones
//! reuse the version recorded in remote state and never hit the write API.

use crate::error::{StagingError, VersionError};
use crate::planner::TestPlan;
use crate::staging::Stager;
use crate::tasker::{run_tasks, Results, Task};
use std::collections::BTreeMap;
use tfsync_graph::{
    LibraryResource, RemoteState, Resource, ResourceGraph, ResourceKind, TransformationResource,
    Urn,
};
use tokio_util::sync::CancellationToken;

/// Remote IDs for local transformations and libraries.
///
/// A non-empty import claim wins over the managed remote-state entry.
/// Remote-state entries are kept even when their ID is empty.
#[must_use]
pub fn build_remote_id_by_urn(local: &ResourceGraph, remote_state: &RemoteState) -> BTreeMap<Urn, String> {
    let mut out = BTreeMap::new();
    for resource in local.resources().filter(|r| r.urn.kind().is_some()) {
        if let Some(remote_id) = resource.import_remote_id() {
            out.insert(resource.urn.clone(), remote_id.to_string());
        } else if let Some(state) = remote_state.get(&resource.urn) {
            out.insert(resource.urn.clone(), state.output.remote_id.clone());
        }
    }
    out
}

#[derive(Debug, Clone)]
enum Subject {
    Transformation(TransformationResource),
    Library(LibraryResource),
}

impl Subject {
    fn kind(&self) -> ResourceKind {
        match self {
            Self::Transformation(_) => ResourceKind::Transformation,
            Self::Library(_) => ResourceKind::Library,
        }
    }

    fn id(&self) -> &str {
        match self {
            Self::Transformation(t) => &t.id,
            Self::Library(l) => &l.id,
        }
    }
}

/// Resolve one resource's version
#[derive(Debug, Clone)]
struct VersionTask {
    urn: Urn,
    subject: Subject,
    modified: bool,
    remote_id: Option<String>,
    import_remote_id: Option<String>,
}

impl Task for VersionTask {
    fn id(&self) -> String {
        self.urn.to_string()
    }
}

/// Resolves version IDs for a plan
pub struct VersionResolver<'a> {
    stager: &'a Stager,
    local: &'a ResourceGraph,
    remote_state: &'a RemoteState,
    concurrency: usize,
}

impl<'a> VersionResolver<'a> {
    #[must_use]
    pub fn new(
        stager: &'a Stager,
        local: &'a ResourceGraph,
        remote_state: &'a RemoteState,
        concurrency: usize,
    ) -> Self {
        Self {
            stager,
            local,
            remote_state,
            concurrency,
        }
    }

    /// Version ID for every unique transformation and library in `plan`.
    ///
    /// # Errors
    ///
    /// Returns every failed task joined into one [`StagingError`].
    pub async fn resolve(
        &self,
        plan: &TestPlan,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<Urn, String>, StagingError> {
        let tasks = self.tasks(plan);
        let urns: Vec<Urn> = tasks.iter().map(|t| t.urn.clone()).collect();
        tracing::info!(
            resources = tasks.len(),
            staged = tasks.iter().filter(|t| t.modified).count(),
            "resolving versions"
        );

        let results = Results::new();
        let errors = run_tasks(tasks, self.concurrency, cancel, |task| {
            let results = &results;
            async move {
                let version = self.resolve_one(&task).await?;
                results.store(task.id(), version);
                Ok::<(), VersionError>(())
            }
        })
        .await;
        if !errors.is_empty() {
            return Err(StagingError::Joined(errors));
        }

        urns.into_iter()
            .map(|urn| {
                results
                    .get(urn.as_str())
                    .map(|v| (urn.clone(), v))
                    .ok_or_else(|| StagingError::MissingResult(urn.to_string()))
            })
            .collect()
    }

    fn tasks(&self, plan: &TestPlan) -> Vec<VersionTask> {
        let remote_ids = build_remote_id_by_urn(self.local, self.remote_state);
        let mut unique: BTreeMap<Urn, VersionTask> = BTreeMap::new();
        let mut add = |urn: &Urn, subject: Subject| {
            unique.entry(urn.clone()).or_insert_with(|| VersionTask {
                urn: urn.clone(),
                subject,
                modified: plan.is_modified(urn),
                remote_id: remote_ids.get(urn).cloned(),
                import_remote_id: self
                    .local
                    .get_resource(urn)
                    .and_then(Resource::import_remote_id)
                    .map(str::to_string),
            });
        };

        for unit in &plan.test_units {
            add(&unit.urn, Subject::Transformation(unit.transformation.clone()));
            for lib in &unit.libraries {
                add(&lib.urn, Subject::Library(lib.library.clone()));
            }
        }
        for lib in &plan.standalone_libraries {
            add(&lib.urn, Subject::Library(lib.library.clone()));
        }
        unique.into_values().collect()
    }

    async fn resolve_one(&self, task: &VersionTask) -> Result<String, VersionError> {
        if task.modified {
            let remote_id = task.remote_id.as_deref();
            return match &task.subject {
                Subject::Transformation(t) => self.stager.stage_transformation(t, remote_id).await,
                Subject::Library(l) => self.stager.stage_library(l, remote_id).await,
            };
        }

        let kind = task.subject.kind();
        let id = task.subject.id().to_string();
        let entry = self.remote_state.get(&task.urn).or_else(|| {
            task.import_remote_id
                .as_deref()
                .and_then(|rid| self.remote_state.get_unmanaged(rid))
        });
        let Some(entry) = entry else {
            return Err(VersionError::NotInRemoteState { kind, id });
        };
        if entry.output.version_id.is_empty() {
            return Err(VersionError::NoVersionId { kind, id });
        }
        tracing::debug!(
            resource = %task.urn,
            version_id = %entry.output.version_id,
            "reusing existing version"
        );
        Ok(entry.output.version_id.clone())
    }
}
